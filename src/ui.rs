// UI layer: collects the search term, runs the request behind a spinner
// and prints results and rate-limit statistics. All styling lives here;
// the API client only hands back data.

use std::time::Duration;

use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{ApiClient, CancelToken, SearchError, SearchRequest, Transport};
use crate::config::Config;
use crate::models::SearchResult;
use crate::rate_limit::{RateLimitInfo, UNKNOWN};

/// Use the term given on the command line, or ask for one.
pub fn read_query(arg: Option<String>) -> Result<String> {
    let query = match arg {
        Some(arg) => arg,
        // `allow_empty` so an empty answer reaches the caller's check
        // instead of re-prompting forever.
        None => Input::new()
            .with_prompt("Photo search term")
            .allow_empty(true)
            .interact_text()?,
    };
    Ok(query.trim().to_string())
}

/// Run one search and print the outcome. Search failures are reported to
/// the user and are not returned as errors.
pub fn run_search<T: Transport>(
    api: &ApiClient<T>,
    config: &Config,
    query: &str,
    cancel: &CancelToken,
) -> Result<()> {
    if query.is_empty() {
        println!("Search term must not be empty.");
        return Ok(());
    }
    log::debug!("searching {:?} at {}", query, config.base_url);

    let req = SearchRequest::new(query, config.api_key.as_str(), config.base_url.as_str());

    // indicatif's spinner keeps ticking while the blocking call runs.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message("Searching...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = api.search_with_cancel(&req, cancel);
    spinner.finish_and_clear();

    match outcome {
        Ok((result, rate_limit)) => {
            log::debug!("got {} of {} photos", result.items.len(), result.total_results);
            print_photos(&result);
            print_rate_limit(&rate_limit);
        }
        Err(err) => {
            log::debug!("search failed: {:?}", err);
            println!("{}", describe_error(&err).red());
            if let Some(rate_limit) = err.rate_limit() {
                print_rate_limit(rate_limit);
            }
        }
    }
    Ok(())
}

/// One numbered line per photo: photographer, description and links.
pub fn print_photos(result: &SearchResult) {
    if result.items.is_empty() {
        println!("No photos found.");
        return;
    }
    for (index, photo) in result.items.iter().enumerate() {
        let photographer = photo.photographer_name.as_str().blue().bold();
        let description = photo.alt_text.as_str().magenta().italic();
        let link = hyperlink(&"URL".cyan().to_string(), &photo.page_url);
        let large = hyperlink(
            &"Large".dark_green().to_string(),
            photo.sources.large.as_deref().unwrap_or_default(),
        );
        println!("{} {}: {} {} {}", index + 1, photographer, description, link, large);
    }
}

pub fn print_rate_limit(rate_limit: &RateLimitInfo) {
    log::debug!("rate limit: {:?}", rate_limit);
    println!("{}", "API rate limit statistics:".yellow().bold());
    println!("Requests per month: {}", stat_value(rate_limit.limit));
    println!("Requests remaining: {}", stat_value(rate_limit.remaining));
    println!("Limit resets at: {}", rate_limit.reset_display());
}

/// User-facing wording for each failure kind.
pub fn describe_error(err: &SearchError) -> String {
    match err {
        SearchError::InvalidInput(reason) => format!("Invalid input: {}", reason),
        SearchError::Transport(cause) => format!("Error making request: {}", cause),
        SearchError::RateLimited(_) => "Too many requests. Please try again later.".into(),
        SearchError::UnexpectedStatus { status, .. } => {
            format!("Error: received status code {}", status)
        }
        SearchError::Decode(cause) => format!("Error decoding response: {}", cause),
        SearchError::Cancelled => "Search cancelled.".into(),
    }
}

/// Wrap `label` in an OSC 8 terminal hyperlink. Terminals without support
/// show the label only.
pub fn hyperlink(label: &str, url: &str) -> String {
    if url.is_empty() {
        return label.to_string();
    }
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, label)
}

fn stat_value(value: Option<u64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}
