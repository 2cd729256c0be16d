use crate::wcs::error::WcsError;
use ndarray::Array2;
use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult};

/// Decodes a `GetCoverage` GeoTIFF payload into a `(y, x)` grid.
///
/// Integer and floating point samples are converted to `f32`. Only the first
/// band of multi-band images is kept.
pub fn decode_geotiff(bytes: &[u8]) -> Result<Array2<f32>, WcsError> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let values = samples_to_f32(decoder.read_image()?);
    let pixels = width * height;
    if pixels == 0 || values.len() < pixels || values.len() % pixels != 0 {
        return Err(WcsError::RasterLayout(format!(
            "{} samples for a {}x{} image",
            values.len(),
            width,
            height
        )));
    }

    let bands = values.len() / pixels;
    let first_band: Vec<f32> = if bands == 1 {
        values
    } else {
        values.into_iter().step_by(bands).collect()
    };
    Array2::from_shape_vec((height, width), first_band)
        .map_err(|e| WcsError::RasterLayout(e.to_string()))
}

fn samples_to_f32(image: DecodingResult) -> Vec<f32> {
    match image {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tiff::encoder::{colortype, TiffEncoder};

    pub(crate) fn gray_f32_tiff(width: u32, height: u32, data: &[f32]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        TiffEncoder::new(&mut buffer)
            .unwrap()
            .write_image::<colortype::Gray32Float>(width, height, data)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_decode_float_grid() {
        let data: Vec<f32> = (0..6).map(|v| v as f32 * 0.5).collect();
        let grid = decode_geotiff(&gray_f32_tiff(3, 2, &data)).unwrap();
        assert_eq!(grid.dim(), (2, 3));
        assert_eq!(grid[[0, 0]], 0.0);
        assert_eq!(grid[[1, 2]], 2.5);
    }

    #[test]
    fn test_decode_integer_grid() {
        let mut buffer = Cursor::new(Vec::new());
        TiffEncoder::new(&mut buffer)
            .unwrap()
            .write_image::<colortype::Gray16>(2, 2, &[1, 2, 3, 1000])
            .unwrap();
        let grid = decode_geotiff(&buffer.into_inner()).unwrap();
        assert_eq!(grid[[1, 1]], 1000.0);
    }

    #[test]
    fn test_rgb_keeps_first_band() {
        let mut buffer = Cursor::new(Vec::new());
        TiffEncoder::new(&mut buffer)
            .unwrap()
            .write_image::<colortype::RGB8>(2, 1, &[10, 20, 30, 40, 50, 60])
            .unwrap();
        let grid = decode_geotiff(&buffer.into_inner()).unwrap();
        assert_eq!(grid.as_slice().unwrap(), &[10.0, 40.0]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = decode_geotiff(b"<ows:ExceptionReport/>").unwrap_err();
        assert!(matches!(err, WcsError::RasterDecode(_)));
    }
}
