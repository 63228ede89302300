//! HTML dashboard: rules, daily report, and recent alerts at a glance.

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use chrono::DateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::app_state::AppState;
use crate::error::HubError;
use crate::feed::known_feeds;

/// Inline CSS for the dashboard. Flat design, no external assets.
const PAGE_CSS: &str = r"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;line-height:1.5;color:#111;background:#fafafa;padding:1.5rem 1rem;display:flex;flex-direction:column;align-items:center}
main{max-width:880px;width:100%}
h1{font-size:1.6rem;margin-bottom:1rem}
h2{font-size:1.1rem;margin:1.5rem 0 .5rem}
table{width:100%;border-collapse:collapse;background:#fff;font-size:.9rem}
th,td{text-align:left;padding:.4rem .6rem;border-bottom:1px solid #eee}
th{color:#555;font-weight:600}
form{display:flex;gap:.5rem;flex-wrap:wrap;align-items:center;margin:.5rem 0}
input,select{padding:.35rem .5rem;border:1px solid #ccc;border-radius:5px}
button{padding:.35rem .8rem;border:none;border-radius:5px;background:#2563eb;color:#fff;cursor:pointer}
button:hover{background:#1d4ed8}
.muted{color:#999;font-size:.85rem}
.links{margin-top:1.5rem;font-size:.85rem}
.links a{color:#2563eb;text-decoration:none;margin-right:1rem}
";

fn format_ms(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// `GET /` — Render the dashboard.
///
/// # Errors
///
/// Returns [`HubError::Storage`] when any of the backing queries fail.
pub async fn home(State(state): State<AppState>) -> Result<Markup, HubError> {
    let rules = state.store.list_rules().await?;
    let report = state.store.daily_report(7).await?;
    let alerts = state.store.list_alerts(25).await?;
    let recent = state.store.list_recent_quakes(10).await?;

    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Earthquake Alert Hub" }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                main {
                    h1 { "Earthquake Alert Hub" }

                    h2 { "Ingest" }
                    form method="post" action="/ingest" {
                        select name="feed" {
                            @for feed in known_feeds() {
                                option value=(feed) { (feed) }
                            }
                        }
                        button type="submit" { "Ingest now" }
                    }

                    h2 { "Rules" }
                    @if rules.is_empty() {
                        p class="muted" { "No rules yet. Add one below." }
                    } @else {
                        table {
                            tr { th { "#" } th { "Name" } th { "Min mag" } th { "Bounding box" } }
                            @for rule in &rules {
                                tr {
                                    td { (rule.id) }
                                    td { (rule.name) }
                                    td { (rule.min_mag) }
                                    td { (rule.bbox.map_or_else(|| "anywhere".to_string(), |b| b.to_string())) }
                                }
                            }
                        }
                    }
                    form method="post" action="/rules" {
                        input name="name" placeholder="Name" required;
                        input name="min_mag" type="number" step="0.1" min="0" placeholder="Min magnitude" required;
                        input name="bbox" placeholder="lon1,lat1,lon2,lat2 (optional)";
                        button type="submit" { "Add rule" }
                    }

                    h2 { "Daily report (7 days, UTC)" }
                    @if report.is_empty() {
                        p class="muted" { "No quakes stored yet." }
                    } @else {
                        table {
                            tr { th { "Day" } th { "Quakes" } th { "Avg mag" } th { "Max mag" } }
                            @for bucket in &report {
                                tr {
                                    td { (bucket.day) }
                                    td { (bucket.count) }
                                    td { (bucket.avg_mag) }
                                    td { (bucket.max_mag) }
                                }
                            }
                        }
                    }

                    h2 { "Recent quakes" }
                    @if recent.is_empty() {
                        p class="muted" { "Nothing ingested yet." }
                    } @else {
                        table {
                            tr {
                                th { "Time" } th { "Mag" } th { "Place" }
                                th { "Depth (km)" }
                            }
                            @for quake in &recent {
                                tr {
                                    td { (format_ms(quake.time_ms)) }
                                    td { (quake.mag) }
                                    td { (quake.place) }
                                    td { (quake.depth_km) }
                                }
                            }
                        }
                    }

                    h2 { "Recent alerts" }
                    @if alerts.is_empty() {
                        p class="muted" { "No alerts yet." }
                    } @else {
                        table {
                            tr {
                                th { "When" } th { "Rule" } th { "Quake" }
                                th { "Mag" } th { "Place" }
                            }
                            @for alert in &alerts {
                                tr {
                                    td { (format_ms(alert.created_ms)) }
                                    td { (alert.rule_name) }
                                    td { (alert.quake_id) }
                                    td { (alert.mag) }
                                    td { (alert.place) }
                                }
                            }
                        }
                    }

                    div class="links" {
                        a href="/events/tail" { "Event tail" }
                        a href="/events/stream" { "Live stream" }
                        a href="/metrics" { "Metrics" }
                        a href="/health" { "Health" }
                    }
                }
            }
        }
    })
}

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(home))
}
