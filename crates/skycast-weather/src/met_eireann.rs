//! Met Éireann CAP-style weather warning provider.
//!
//! Warnings arrive as an RSS summary feed of alert links; each link points
//! at a CAP alert detail document. The summary is authoritative for the
//! alert category, since upstream detail documents mislabel marine alerts.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::{Capability, Provider, ProviderInfo, WarningSource};
use crate::region::RegionStore;
use crate::types::WeatherError;
use crate::warning::{Category, Severity, WarningEntry, WeatherWarnings};

/// Published dates are always GMT, ignoring DST
const PUBLISHED_FMT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Detail links with this scheme resolve relative to the cached summary file
const CACHED_FILE_MARKER: &str = "file://";

// -- wire format --------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Option<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<SummaryItem>,
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    #[serde(default)]
    link: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Alert {
    #[serde(default)]
    sent: Option<String>,
    #[serde(rename = "msgType", default)]
    msg_type: Option<String>,
    #[serde(rename = "info", default)]
    info: Vec<AlertInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct AlertInfo {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    event: Option<String>,
    #[serde(rename = "responseType", default)]
    response_type: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    certainty: Option<String>,
    #[serde(default)]
    onset: Option<String>,
    #[serde(default)]
    expires: Option<String>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    instruction: Option<String>,
    #[serde(rename = "parameter", default)]
    parameters: Vec<NamedValue>,
    #[serde(default)]
    area: Option<AlertArea>,
}

#[derive(Debug, Deserialize)]
struct NamedValue {
    #[serde(rename = "valueName")]
    value_name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct AlertArea {
    #[serde(rename = "areaDesc", default)]
    area_desc: Option<String>,
    #[serde(rename = "geocode", default)]
    geocodes: Vec<NamedValue>,
}

// -- parsing ------------------------------------------------------------

fn parse_cap_datetime(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, WeatherError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| WeatherError::Parse(format!("bad alert timestamp '{raw}'"))),
    }
}

/// Parse a summary item's published date (always GMT)
fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>, WeatherError> {
    NaiveDateTime::parse_from_str(raw, PUBLISHED_FMT)
        .map(|dt| dt.and_utc())
        .map_err(|_| WeatherError::Parse(format!("bad published date '{raw}'")))
}

/// Resolve a summary item's detail link.
///
/// A `file://` pseudo-link resolves relative to the cached summary file for
/// deterministic offline replay.
fn warning_link(cached_result: Option<&Path>, link: &str) -> DetailSource {
    if let Some(file) = link.strip_prefix(CACHED_FILE_MARKER) {
        let path = cached_result
            .map(|p| p.with_file_name(file))
            .unwrap_or_else(|| file.into());
        DetailSource::File(path)
    } else {
        DetailSource::Url(link.to_string())
    }
}

enum DetailSource {
    Url(String),
    File(std::path::PathBuf),
}

/// Resolve an area geocode to a display name through the region store.
///
/// FIPS codes resolve to the medium name, marine codes to the long name. An
/// unknown code is a reference-data mismatch and a hard error.
fn resolve_area(regions: &RegionStore, geocode: &NamedValue) -> Result<String, WeatherError> {
    let code = geocode.value.to_uppercase();
    let region = regions
        .get(&code)
        .ok_or_else(|| WeatherError::UnknownRegion(code.clone()))?;
    Ok(if geocode.value_name.starts_with("FIPS") {
        region.med_name.clone()
    } else {
        region.long_name.clone()
    })
}

/// Parse a CAP alert detail document into a [`WarningEntry`].
///
/// `summary_category` overrides the detail document's category field. Keys
/// the payload does not populate default to `None`/empty.
fn parse_warning(
    payload: &str,
    summary_category: Option<&str>,
    pub_date: Option<DateTime<Utc>>,
    regions: &RegionStore,
) -> Result<WarningEntry, WeatherError> {
    let alert: Alert = serde_xml_rs::from_str(payload)
        .map_err(|e| WeatherError::Parse(format!("bad alert payload: {e}")))?;

    let info = alert.info.into_iter().next().unwrap_or_default();

    let category_name = summary_category
        .map(str::to_string)
        .or(info.category)
        .unwrap_or_default();
    let category = Category::from_name(&category_name)?;
    let severity = Severity::from_name(info.severity.as_deref().unwrap_or_default())?;

    let mut awareness_level = String::new();
    let mut awareness_type = String::new();
    for param in &info.parameters {
        // only recognized parameters are captured
        match param.value_name.as_str() {
            "awareness_level" => awareness_level = param.value.clone(),
            "awareness_type" => awareness_type = param.value.clone(),
            _ => {}
        }
    }

    let area = info.area.unwrap_or_default();
    let areas = area
        .geocodes
        .iter()
        .map(|geocode| resolve_area(regions, geocode))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WarningEntry {
        sent: parse_cap_datetime(alert.sent.as_deref())?.or(pub_date),
        msg_type: alert.msg_type.unwrap_or_default(),
        category,
        event: info.event.unwrap_or_default(),
        response: info.response_type.unwrap_or_default(),
        urgency: info.urgency.unwrap_or_default(),
        severity,
        certainty: info.certainty.unwrap_or_default(),
        onset: parse_cap_datetime(info.onset.as_deref())?,
        expires: parse_cap_datetime(info.expires.as_deref())?,
        title: info.headline.unwrap_or_default(),
        description: info.description.unwrap_or_default(),
        instruction: info.instruction.unwrap_or_default(),
        awareness_level,
        awareness_type,
        area_desc: area.area_desc.unwrap_or_default(),
        areas,
        icon: String::new(),
    })
}

// -- provider -----------------------------------------------------------

/// Met Éireann weather warning provider
pub struct MetEireannWarningProvider {
    info: ProviderInfo,
    client: reqwest::Client,
    regions: Arc<RegionStore>,
}

impl MetEireannWarningProvider {
    pub fn new(info: ProviderInfo, client: reqwest::Client, regions: Arc<RegionStore>) -> Self {
        Self {
            info,
            client,
            regions,
        }
    }

    /// Fetch an XML document.
    ///
    /// The upstream response header claims a 1-byte encoding while the
    /// payload's XML declaration says UTF-8; the body bytes are decoded as
    /// UTF-8 rather than trusting the header.
    async fn fetch_xml(&self, url: &str) -> Result<String, WeatherError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn read_detail(&self, source: &DetailSource) -> Result<String, WeatherError> {
        match source {
            DetailSource::Url(url) => self.fetch_xml(url).await,
            DetailSource::File(path) => Ok(std::fs::read_to_string(path)?),
        }
    }
}

impl Provider for MetEireannWarningProvider {
    fn info(&self) -> &ProviderInfo {
        &self.info
    }

    fn capability(&self) -> Capability {
        Capability::Warning
    }

    fn warning_source(&self) -> Option<&dyn WarningSource> {
        Some(self)
    }
}

#[async_trait]
impl WarningSource for MetEireannWarningProvider {
    async fn get_warnings(&self) -> Result<WeatherWarnings, WeatherError> {
        let mut warnings =
            WeatherWarnings::new(self.info.name.clone(), self.info.friendly_name.clone());

        let summary = if self.info.cached_result.is_some() {
            let cached = self.info.read_cached_resp();
            warnings.cached = cached.is_some();
            cached
        } else {
            match self.fetch_xml(self.info.data_endpoint()).await {
                Ok(text) => Some(text),
                Err(e) => {
                    // transport failure degrades to an empty warning list
                    warn!(provider = %self.info.name, "Warning summary fetch failed: {e}");
                    None
                }
            }
        };

        let Some(summary) = summary else {
            return Ok(warnings);
        };

        let rss: Rss = serde_xml_rs::from_str(&summary)
            .map_err(|e| WeatherError::Parse(format!("bad warning summary: {e}")))?;
        let items = rss.channel.map(|c| c.items).unwrap_or_default();

        for item in &items {
            let Some(link) = item.link.as_deref() else {
                continue;
            };
            let source = warning_link(self.info.cached_result.as_deref(), link);

            let pub_date = match item.pub_date.as_deref() {
                Some(raw) => Some(parse_pub_date(raw)?),
                None => None,
            };

            let detail = match self.read_detail(&source).await {
                Ok(detail) => detail,
                Err(e) => {
                    // per-item failures skip the item, not the batch
                    warn!(provider = %self.info.name, link, "Warning detail fetch failed: {e}");
                    continue;
                }
            };

            let mut warning =
                parse_warning(&detail, item.category.as_deref(), pub_date, &self.regions)?;

            // canonical severity comes from the awareness level
            let severity = Severity::from_awareness(&warning.awareness_level)?;
            warning.icon = if warning.is_small_craft() {
                severity.small_craft_icon()
            } else {
                severity.icon()
            };

            warnings.add_warning(warning);
        }

        debug!(
            provider = %self.info.name,
            count = warnings.warnings.len(),
            cached = warnings.cached,
            "Warnings generated"
        );
        Ok(warnings)
    }
}
