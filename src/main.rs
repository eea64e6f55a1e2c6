use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use travelmate::advice::OutfitAdvisor;
use travelmate::cli::{prompt_line, select_hotel};
use travelmate::geocode::OpenMeteoGeocoder;
use travelmate::hotel::{HotelMatcher, HotelResolver, LlmHotelMatcher};
use travelmate::llm::OpenAiClient;
use travelmate::planner::{
    TripPlanner, WeatherQuery, extract_trip_request, extract_weather_query, run_weather_tools, weather_report,
};
use travelmate::weather::{ExtendedForecast, OpenMeteoClient, WeatherAggregator};
use travelmate::{TravelConfig, TravelError, logging};

#[derive(Debug, Parser)]
#[command(name = "travelmate")]
#[command(about = "Travel planning with tiered weather, hotel matching and generated itineraries")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "TRAVELMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan a trip interactively: destination, hotel, weather, itinerary
    Plan,
    /// Aggregated daily weather with outfit advice
    Weather(WeatherArgs),
    /// Resolve a hotel name to a ranked, deduplicated shortlist
    Hotels {
        #[arg(long)]
        name: String,
        #[arg(long)]
        region: String,
    },
}

#[derive(Debug, Args)]
struct WeatherArgs {
    /// Free-text request, e.g. "Tokyo from 2025-10-01 to 2025-10-20"
    text: Option<String>,
    #[arg(long, requires = "start")]
    place: Option<String>,
    #[arg(long, requires = "place")]
    start: Option<NaiveDate>,
    /// Defaults to the start date
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,
    /// Skip the per-day outfit advice
    #[arg(long)]
    no_advice: bool,
    /// Let the model choose between the weather and outfit tools
    #[arg(long, requires = "text", conflicts_with_all = ["place", "no_advice"])]
    tools: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<TravelError>() {
                Some(travel_error) => eprintln!("{}", travel_error.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = TravelConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose);
    info!("TravelMate {} starting", travelmate::VERSION);

    let today = Local::now().date_naive();
    match cli.command {
        Commands::Plan => plan(&config, today).await,
        Commands::Weather(args) if args.tools => weather_with_tools(&config, today, args.text.unwrap_or_default()).await,
        Commands::Weather(args) => weather(&config, today, args).await,
        Commands::Hotels { name, region } => hotels(&config, &name, &region).await,
    }
}

async fn plan(config: &TravelConfig, today: NaiveDate) -> Result<()> {
    let model = OpenAiClient::new(&config.llm)?;
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = io::stdout();

    let (user_input, request) = loop {
        let Some(input) = prompt_line(&mut reader, &mut stdout, "Where and for how long are you travelling? ")?
        else {
            return Ok(());
        };
        if input.is_empty() {
            continue;
        }
        match extract_trip_request(&model, &input, &config.defaults, today).await {
            Ok(request) => break (input, request),
            Err(e) => writeln!(stdout, "{}", e.user_message())?,
        }
    };
    writeln!(
        stdout,
        "Trip: {} for {} days from {} (arrival {}, departure {})",
        request.location, request.days, request.start_date, request.arrival_time, request.departure_time
    )?;

    let matcher = LlmHotelMatcher::new(model.clone(), config.hotel.candidate_limit, config.hotel.match_threshold);
    let resolver = HotelResolver::from(&config.hotel);
    let Some(hotel) = select_hotel(&mut reader, &mut stdout, &matcher, &resolver, &request.location).await? else {
        return Ok(());
    };

    let weather = OpenMeteoClient::new(config.weather.clone())?;
    let planner = TripPlanner::new(
        model,
        OpenMeteoGeocoder::new(&config.weather)?,
        ExtendedForecast::new(weather.clone(), weather, config.weather.normals_years),
        config.defaults.clone(),
        config.llm.language.clone(),
    );

    let itinerary = planner.plan(&user_input, &request, Some(&hotel)).await?;
    writeln!(stdout, "\nTravel plan:\n{}", itinerary.text)?;
    Ok(())
}

async fn weather(config: &TravelConfig, today: NaiveDate, args: WeatherArgs) -> Result<()> {
    let model = if args.no_advice && args.place.is_some() {
        None
    } else {
        Some(OpenAiClient::new(&config.llm)?)
    };

    let query = match (args.place, args.start, args.text, model.as_ref()) {
        (Some(place), Some(start), _, _) => WeatherQuery::new(place, start, args.end.unwrap_or(start))?,
        (_, _, Some(text), Some(model)) => extract_weather_query(model, &text, today).await?,
        _ => {
            return Err(TravelError::validation("Give a free-text request or --place and --start").into());
        }
    };

    let geocoder = OpenMeteoGeocoder::new(&config.weather)?;
    let aggregator = WeatherAggregator::new(OpenMeteoClient::new(config.weather.clone())?);
    let advisor = match model {
        Some(model) if !args.no_advice => Some(OutfitAdvisor::new(model, config.llm.language.clone())),
        _ => None,
    };

    let report = weather_report(&geocoder, &aggregator, advisor.as_ref(), query).await?;
    print!("{}", report.render());
    Ok(())
}

async fn weather_with_tools(config: &TravelConfig, today: NaiveDate, text: String) -> Result<()> {
    let model = OpenAiClient::new(&config.llm)?;
    let geocoder = OpenMeteoGeocoder::new(&config.weather)?;
    let aggregator = WeatherAggregator::new(OpenMeteoClient::new(config.weather.clone())?);
    let advisor = OutfitAdvisor::new(model.clone(), config.llm.language.clone());

    let run = run_weather_tools(&model, &geocoder, &aggregator, &advisor, &text, today).await?;
    print!("{}", run.render());
    Ok(())
}

async fn hotels(config: &TravelConfig, name: &str, region: &str) -> Result<()> {
    let model = OpenAiClient::new(&config.llm)?;
    let matcher = LlmHotelMatcher::new(model, config.hotel.candidate_limit, config.hotel.match_threshold);
    let resolver = HotelResolver::from(&config.hotel);

    let ranked = resolver.resolve(matcher.find_candidates(name, region).await);
    if ranked.is_empty() {
        println!("No sufficiently matching hotels found for '{name}' in {region}.");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, hotel) in ranked.iter().enumerate() {
        writeln!(out, "{}. {}", index + 1, hotel.menu_line())?;
    }
    Ok(())
}
