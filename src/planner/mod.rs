//! Trip planning orchestration
//!
//! Every step awaits the previous one: request extraction, geocoding,
//! weather, tourist spots and finally the itinerary itself. The weather
//! report can also be driven by the model through tool calls.

pub mod itinerary;
pub mod report;
pub mod request;
pub mod spots;
pub mod tools;

pub use itinerary::{Itinerary, TripContext, TripPlanner, itinerary_messages, weather_block};
pub use report::{WeatherReport, weather_report};
pub use request::{TripRequest, WeatherQuery, extract_trip_request, extract_weather_query};
pub use spots::find_tourist_spots;
pub use tools::{ToolInvocation, ToolOutput, ToolRun, run_weather_tools, weather_tools};
