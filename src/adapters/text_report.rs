//! Plain-text portfolio report for the console.

use crate::domain::holding::Holding;
use crate::domain::report::ReportEntry;
use std::fmt::Write;

/// Zero-padded `mm/dd/yy`, shared by the report and the history table.
const DATE_LAYOUT: &str = "%m/%d/%y";

/// Insert `,` every three digits of the integer part.
pub fn group_thousands(digits: &str) -> String {
    let (int_part, rest) = match digits.find('.') {
        Some(i) => digits.split_at(i),
        None => (digits, ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + rest.len());
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(rest);
    grouped
}

/// `$1,234.50` / `$-12.00`
pub fn format_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("${sign}{}", group_thousands(&format!("{:.2}", amount.abs())))
}

/// Format a share count without a trailing `.0` for whole numbers.
pub fn format_shares(shares: f64) -> String {
    if shares.fract() == 0.0 {
        format!("{shares:.0}")
    } else {
        shares.to_string()
    }
}

pub fn render(entries: &[ReportEntry]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        out.push_str("No stocks to report.\n");
        return out;
    }

    for entry in entries {
        let _ = writeln!(
            out,
            "{} ({}) - {} shares",
            entry.symbol,
            entry.name,
            format_shares(entry.shares)
        );
        let Some(summary) = &entry.summary else {
            out.push_str("    No historical data.\n");
            continue;
        };
        let _ = writeln!(
            out,
            "    Records: {}  Latest: {} {:.2}",
            summary.records,
            summary.latest_date.format(DATE_LAYOUT),
            summary.latest_close
        );
        let _ = writeln!(
            out,
            "    Close Range: {:.2} - {:.2}  Avg Close: {:.2}",
            summary.min_close, summary.max_close, summary.average_close
        );
        let _ = writeln!(
            out,
            "    Total Volume: {}",
            group_thousands(&summary.total_volume.to_string())
        );
        let _ = writeln!(
            out,
            "    Market Value: {}",
            format_money(summary.market_value)
        );
        let percent = match summary.profit_loss_percent {
            Some(p) => format!("{p:+.2}%"),
            None => "n/a".to_string(),
        };
        let _ = writeln!(
            out,
            "    Profit/Loss: {} ({})",
            format_money(summary.profit_loss),
            percent
        );
    }
    out
}

/// Date/price/volume table of one holding, oldest first.
pub fn render_history(holding: &Holding) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} - {} Shares",
        holding.name(),
        format_shares(holding.shares())
    );
    let series = holding.observations();
    if series.is_empty() {
        out.push_str("No history available.\n");
        return out;
    }
    out.push_str("- Date -      - Price -    - Volume -\n");
    out.push_str("----------------------------------------\n");
    for obs in series.iter() {
        let _ = writeln!(
            out,
            "{}   {}   {}",
            obs.date.format(DATE_LAYOUT),
            format_money(obs.close),
            group_thousands(&(obs.volume as u64).to_string())
        );
    }
    out
}
