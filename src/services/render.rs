// src/services/render.rs
use crate::models::{Period, ReturnsPanel, ReturnsReport, SummaryStats};
use crate::services::chart::distribution_chart;

const PAGE_TITLE: &str = "NSE Returns Distribution Analyzer";
const STYLE: &str = r#"
body{font-family:Arial,sans-serif;margin:0;color:#222;background:#fafafa}
header{padding:16px 24px;background:#fff;border-bottom:1px solid #ddd}
header h1{margin:0 0 4px 0;font-size:24px}
header p{margin:0;color:#666}
form{display:flex;gap:12px;align-items:flex-end;padding:12px 24px;background:#f0f2f6}
form label{display:flex;flex-direction:column;font-size:12px;color:#444}
main{padding:12px 24px}
.banner{padding:10px 14px;border-radius:4px;margin:8px 0}
.banner.success{background:#e6f4ea;color:#1e6b34}
.banner.error{background:#fdecea;color:#8a1c1c}
.panels{display:flex;gap:16px}
.panel{flex:1;min-width:0;background:#fff;border:1px solid #e3e3e3;border-radius:4px;padding:12px}
.panel table{border-collapse:collapse;margin-bottom:8px;font-size:13px}
.panel td,.panel th{padding:2px 10px;border-bottom:1px solid #eee;text-align:right}
.panel th{text-align:left;font-weight:normal;color:#555}
.nra-plot-title{font-weight:bold;margin:6px 0}
.nra-plot-empty{padding:40px 0;text-align:center;color:#999;border:1px dashed #ccc}
"#;

/// What the page body shows below the input form.
pub enum PageBody<'a> {
    Report(&'a ReturnsReport),
    NoData,
    Error(&'a str),
}

pub struct PageView<'a> {
    pub symbol: &'a str,
    pub period: Period,
    pub body: PageBody<'a>,
}

pub fn render_page(view: &PageView) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str(&format!("<title>{}</title><style>{}</style></head><body>", PAGE_TITLE, STYLE));
    html.push_str(&format!(
        "<header><h1>📈 {}</h1><p>Analyze Daily, Weekly, and Monthly Returns for any NSE stock or index.</p></header>",
        PAGE_TITLE
    ));
    html.push_str(&render_form(view.symbol, view.period));
    html.push_str("<main>");

    match &view.body {
        PageBody::Report(report) => {
            html.push_str(&format!(
                r#"<div class="banner success">✅ Data fetched: {} records from {}</div>"#,
                report.record_count,
                escape_html(&report.source)
            ));
            html.push_str(&format!(
                "<h2>📊 Summary Statistics: {} ({})</h2>",
                escape_html(&report.symbol),
                report.period
            ));
            html.push_str(r#"<div class="panels">"#);
            for panel in &report.panels {
                html.push_str(&render_panel(panel));
            }
            html.push_str("</div>");
        }
        PageBody::NoData => {
            html.push_str(
                r#"<div class="banner error">❌ Failed to fetch data. Please check the ticker symbol or your internet connection.</div>"#,
            );
        }
        PageBody::Error(message) => {
            html.push_str(&format!(
                r#"<div class="banner error">❌ {}</div>"#,
                escape_html(message)
            ));
        }
    }

    html.push_str("</main></body></html>");
    html
}

fn render_form(symbol: &str, period: Period) -> String {
    let options: String = Period::ALL
        .iter()
        .map(|p| {
            let selected = if *p == period { " selected" } else { "" };
            format!(r#"<option value="{v}"{s}>{v}</option>"#, v = p.as_str(), s = selected)
        })
        .collect();

    format!(
        r#"<form method="get" action="/"><label>Enter NSE Ticker Symbol (e.g., RELIANCE.NS, ^NSEI)<input type="text" name="symbol" value="{symbol}"></label><label>Select Time Period<select name="period">{options}</select></label><button type="submit">Analyze</button></form>"#,
        symbol = escape_html(symbol),
        options = options
    )
}

/// One granularity: statistics table followed by the distribution chart.
pub fn render_panel(panel: &ReturnsPanel) -> String {
    format!(
        r#"<section class="panel"><h3>{label} Returns</h3>{table}{chart}</section>"#,
        label = panel.granularity.label(),
        table = render_summary_table(&panel.summary),
        chart = distribution_chart(panel)
    )
}

pub fn render_summary_table(stats: &SummaryStats) -> String {
    let rows = [
        ("mean", stats.mean),
        ("std", stats.std),
        ("min", stats.min),
        ("25%", stats.q25),
        ("50%", stats.q50),
        ("75%", stats.q75),
        ("max", stats.max),
    ];

    let mut html = String::from("<table><tbody>");
    html.push_str(&format!("<tr><th>count</th><td>{}</td></tr>", stats.count));
    for (name, value) in rows {
        html.push_str(&format!("<tr><th>{}</th><td>{}</td></tr>", name, format_stat(value)));
    }
    html.push_str("</tbody></table>");
    html
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", v),
        _ => "no data".to_string(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
