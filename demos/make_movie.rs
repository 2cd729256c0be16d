use meteofrance_wcs::{BoundingBox, ColorScale, MeteoFrance, MeteoFranceError, RenderOptions};
use std::env;

const TITLE: &str = "Temperature at specified height level above ground";

#[tokio::main]
async fn main() -> Result<(), MeteoFranceError> {
    env_logger::init();

    let client = match env::var("METEOFRANCE_TOKEN") {
        Ok(token) => MeteoFrance::with_token(token)?,
        Err(_) => {
            MeteoFrance::fetch_token()
                .credentials_file("credentials.json")
                .call()
                .await?
        }
    };

    let arome = client
        .select_product()
        .dataset("arome")
        .area("france")
        .accuracy(0.025)
        .call()
        .await?;

    // Next 24 hours over Brittany, from the latest run reaching that far.
    let coverage = arome
        .select_coverage()
        .title(TITLE)
        .call()?
        .check_run_time(24)
        .await?
        .set_bbox_of_interest(BoundingBox::new(-5.2, 47.2, -1.0, 48.9)?)?;
    println!(
        "Fetching {} time steps of {}",
        coverage.requested_steps().len(),
        coverage.coverage_id()
    );

    let array = coverage.create_3d_array().await?;
    println!("Array shape {:?}, values {:?}", array.shape(), array.value_range());

    let options = RenderOptions::builder()
        .color_scale(ColorScale::temperature())
        .output_dir("movies")
        .delay_cs(30)
        .pixel_scale(4)
        .build();
    let movie = array.make_movie("brittany_t2m", &options).await?;
    println!("Movie written to {}", movie.path.display());

    Ok(())
}
