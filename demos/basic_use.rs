use meteofrance_wcs::{MeteoFrance, MeteoFranceError, ServiceConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), MeteoFranceError> {
    env_logger::init();

    // Either a token obtained earlier, or the account credentials.
    let config = ServiceConfig::from_env();
    let client = match env::var("METEOFRANCE_TOKEN") {
        Ok(token) => MeteoFrance::with_config(token, config)?,
        Err(_) => {
            MeteoFrance::fetch_token()
                .credentials_file("credentials.json")
                .config(config)
                .call()
                .await?
        }
    };

    let arpege = client
        .select_product()
        .dataset("arpege")
        .area("europe")
        .call()
        .await?;
    println!("{}", arpege.product());
    println!("{}", arpege.capabilities().frame());

    for title in arpege.list_titles()? {
        let run_times = arpege.list_available_run_times(&title)?;
        println!(
            "{title}: {} run-times, latest {:?}",
            run_times.len(),
            run_times.last().map(ToString::to_string)
        );
    }

    let pressure = arpege
        .select_coverage()
        .title("Pressure at ground or water surface")
        .call()?
        .describe()
        .await?;
    println!(
        "{} covers {:?} with {} time steps",
        pressure.coverage_id(),
        pressure.max_bbox(),
        pressure.time_steps().len()
    );

    Ok(())
}
