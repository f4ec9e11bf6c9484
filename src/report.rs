// Turns the raw row list into operator-facing output: a sorted top-5 text
// report, an alert message for the cheapest under-threshold combination,
// and the JSON snapshot persisted after every run.

use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::config::ScanConfig;
use crate::offer::{CabinClass, Offer, Segment};
use crate::search::{CombinedRow, ScanResults};
use crate::selector::LegQuote;

pub const TOP_N: usize = 5;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
}

// Persisted once per run, overwriting the previous snapshot.
#[derive(Debug, Serialize)]
pub struct RunSnapshot {
    pub generated: NaiveDate,
    pub top5: Vec<CombinedRow>,
    pub alerts: Vec<CombinedRow>,
}

#[derive(Debug)]
pub struct RunReport {
    pub text_report: String,
    pub alert_message: Option<String>,
    pub snapshot: RunSnapshot,
}

pub struct ResultReporter {
    threshold: f64,
    prefer_nonstop: bool,
    outbound_cabin: CabinClass,
    return_cabin: CabinClass,
}

impl ResultReporter {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            threshold: config.threshold,
            prefer_nonstop: config.prefer_nonstop,
            outbound_cabin: config.outbound_cabin,
            return_cabin: config.return_cabin,
        }
    }

    // Sort rows and alerts by total ascending, render the text report and
    // (when any alert exists) the message for the cheapest one, and build
    // the snapshot. The snapshot is always produced, alerts or not.
    pub fn summarize(&self, results: ScanResults, generated: NaiveDate) -> RunReport {
        let ScanResults { mut rows, mut alerts } = results;
        rows.sort_by(|a, b| a.total.total_cmp(&b.total));
        alerts.sort_by(|a, b| a.total.total_cmp(&b.total));

        let text_report = self.render_top(&rows);
        let alert_message = alerts.first().map(|best| self.render_alert(best));

        let snapshot = RunSnapshot {
            generated,
            top5: rows.into_iter().take(TOP_N).collect(),
            alerts,
        };

        RunReport {
            text_report,
            alert_message,
            snapshot,
        }
    }

    fn render_top(&self, rows: &[CombinedRow]) -> String {
        let mut out = String::from("Top 5 cheapest mixed-cabin combos:\n");
        for row in rows.iter().take(TOP_N) {
            let _ = writeln!(
                out,
                "{} → {} | Out ${:.2} + Back ${:.2} = ${:.2} | Out stops: {}, Back stops: {}",
                row.out_date,
                row.ret_date,
                row.out.amount,
                row.ret.amount,
                row.total,
                row.out.stops,
                row.ret.stops,
            );
        }
        out
    }

    fn render_alert(&self, best: &CombinedRow) -> String {
        let out_text = self.render_leg("Outbound", self.outbound_cabin, &best.out);
        let ret_text = self.render_leg("Return", self.return_cabin, &best.ret);

        format!(
            "✈️ *Deal found under ${:.0}* — *${:.2} total*\n\
             Dates: {} → {}\n\n\
             {}\n\n\
             {}\n\n\
             Offer IDs: out `{}` / back `{}`",
            self.threshold,
            best.total,
            best.out_date,
            best.ret_date,
            out_text,
            ret_text,
            best.out.offer_id,
            best.ret.offer_id,
        )
    }

    fn render_leg(&self, title: &str, cabin: CabinClass, quote: &LegQuote) -> String {
        let summary = LegSummary::from_offer(&quote.offer);

        let stops_txt = match summary.stops {
            0 => "Nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{n} stops"),
        };
        let preference_note = if self.prefer_nonstop && summary.stops > 0 {
            " _(nonstop not available; best alternative)_"
        } else {
            ""
        };
        let airlines = if summary.airlines.is_empty() {
            "Unknown".to_string()
        } else {
            summary.airlines.join(", ")
        };
        let flights = if summary.flights.is_empty() {
            "Unknown".to_string()
        } else {
            summary.flights.join(", ")
        };

        format!(
            "*{title}* ({cabin}) — *${amount:.2}*{preference_note}\n\
             {origin} → {destination} | {depart} → {arrive}\n\
             {stops_txt} | Duration {duration}\n\
             Airline(s): {airlines}\n\
             Flights: {flights}",
            cabin = cabin.label(),
            amount = quote.amount,
            origin = summary.origin,
            destination = summary.destination,
            depart = summary.depart,
            arrive = summary.arrive,
            duration = summary.duration,
        )
    }
}

pub fn write_snapshot(path: &Path, snapshot: &RunSnapshot) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

// The fields of a one-way offer worth showing in a message. Assumes one
// slice, as all offers here are one-way.
#[derive(Debug)]
struct LegSummary {
    origin: String,
    destination: String,
    depart: String,
    arrive: String,
    stops: u32,
    duration: String,
    airlines: Vec<String>,
    flights: Vec<String>,
}

impl LegSummary {
    fn from_offer(offer: &Offer) -> Self {
        let placeholder = Self {
            origin: "?".to_string(),
            destination: "?".to_string(),
            depart: "?".to_string(),
            arrive: "?".to_string(),
            stops: 0,
            duration: "N/A".to_string(),
            airlines: Vec::new(),
            flights: Vec::new(),
        };

        let Some(slice) = offer.slices.first() else {
            return placeholder;
        };
        let duration = slice.duration.clone().unwrap_or_else(|| "N/A".to_string());
        let (Some(first), Some(last)) = (slice.segments.first(), slice.segments.last()) else {
            return Self { duration, ..placeholder };
        };

        let airlines = dedupe_preserving_order(slice.segments.iter().map(carrier_name));
        let flights = slice.segments.iter().map(flight_designator).collect();

        Self {
            origin: first.origin.iata_code.clone(),
            destination: last.destination.iata_code.clone(),
            depart: fmt_time(&first.departing_at),
            arrive: fmt_time(&last.arriving_at),
            stops: offer.stops(),
            duration,
            airlines,
            flights,
        }
    }
}

// "2026-09-15T17:40:00" -> "2026-09-15 17:40"
fn fmt_time(iso: &str) -> String {
    let mut text = iso.replace('T', " ");
    text.truncate(16);
    text
}

fn carrier_name(segment: &Segment) -> String {
    segment
        .marketing_carrier
        .as_ref()
        .and_then(|c| c.name.clone().or_else(|| c.iata_code.clone()))
        .unwrap_or_else(|| "Unknown airline".to_string())
}

fn flight_designator(segment: &Segment) -> String {
    let code = segment
        .marketing_carrier
        .as_ref()
        .and_then(|c| c.iata_code.clone())
        .unwrap_or_default();
    let number = segment.marketing_flight_number.clone().unwrap_or_default();
    match (code.is_empty(), number.is_empty()) {
        (false, false) => format!("{code}{number}"),
        (true, false) => number,
        _ => "Flight".to_string(),
    }
}

fn dedupe_preserving_order(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for name in names {
        if seen.insert(name.clone()) {
            unique.push(name);
        }
    }
    unique
}
