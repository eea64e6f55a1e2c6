//! Console interaction: prompts and the hotel selection loop

use std::io::{BufRead, Write};

use tracing::debug;

use crate::hotel::{HotelMatcher, HotelResolver};
use crate::models::RankedHotel;
use crate::{Result, TravelError};

/// A menu answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// 0: enter a different name
    Retry,
    /// Zero-based index into the menu
    Select(usize),
}

/// Parse a 1-based menu number; 0 means retry
pub fn parse_choice(input: &str, count: usize) -> Result<Choice> {
    let number: usize = input
        .trim()
        .parse()
        .map_err(|_| TravelError::validation(format!("'{}' is not a number", input.trim())))?;
    match number {
        0 => Ok(Choice::Retry),
        n if n <= count => Ok(Choice::Select(n - 1)),
        n => Err(TravelError::validation(format!(
            "{n} is not between 0 and {count}"
        ))),
    }
}

/// Print `prompt` and read one line; `None` at end of input
pub fn prompt_line<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(writer, "{prompt}")?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Numbered candidate list followed by the retry entry
#[must_use]
pub fn render_menu(candidates: &[RankedHotel]) -> String {
    let mut menu = String::from("\nCandidates (sorted by similarity and distance, duplicates removed):\n");
    for (index, hotel) in candidates.iter().enumerate() {
        menu.push_str(&format!("{}. {}\n", index + 1, hotel.menu_line()));
    }
    menu.push_str("0. Enter a different name\n");
    menu
}

/// Ask for a hotel name until the user picks one of the resolved candidates.
///
/// Returns `None` when input ends before a choice is made.
pub async fn select_hotel<R, W, H>(
    reader: &mut R,
    writer: &mut W,
    matcher: &H,
    resolver: &HotelResolver,
    region: &str,
) -> Result<Option<RankedHotel>>
where
    R: BufRead,
    W: Write,
    H: HotelMatcher,
{
    loop {
        let Some(name) = prompt_line(reader, writer, "Hotel name: ")? else {
            return Ok(None);
        };
        if name.is_empty() {
            continue;
        }

        let raw = matcher.find_candidates(&name, region).await;
        let mut candidates = resolver.resolve(raw);
        if candidates.is_empty() {
            writeln!(writer, "No sufficiently matching hotels found. Please try again.")?;
            continue;
        }

        write!(writer, "{}", render_menu(&candidates))?;
        let Some(answer) = prompt_line(reader, writer, "Choose a number: ")? else {
            return Ok(None);
        };

        match parse_choice(&answer, candidates.len()) {
            Ok(Choice::Select(index)) => {
                let hotel = candidates.swap_remove(index);
                writeln!(writer, "\nSelected hotel: {} - {}", hotel.candidate.name, hotel.candidate.address)?;
                return Ok(Some(hotel));
            }
            Ok(Choice::Retry) => debug!("User asked to re-enter the hotel name"),
            Err(e) => writeln!(writer, "{}", e)?,
        }
    }
}
