//! End-to-end tests for provider registration, forecast generation and
//! warning generation, using mocked upstream endpoints and the shipped
//! reference data files.

use std::io::Write;
use std::path::{Path, PathBuf};

use skycast_core::{Config, ProviderConfig};
use skycast_weather::{
    build_registry, generate_forecast, generate_warnings, load_reference_data, AttribKey,
    Category, DateRange, GeoAddress, Severity,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn forecast_provider(url: &str, cached_result: Option<PathBuf>) -> ProviderConfig {
    ProviderConfig {
        id: "met_eireann".into(),
        kind: "locationforecast_met_eireann".into(),
        name: "Met Éireann".into(),
        url: url.into(),
        data_url: None,
        latitude: Some("lat".into()),
        longitude: Some("long".into()),
        from: Some("from".into()),
        to: Some("to".into()),
        tz: Some("Europe/Dublin".into()),
        country: Some("IE".into()),
        cached_result,
    }
}

fn warning_provider(summary_path: PathBuf) -> ProviderConfig {
    ProviderConfig {
        id: "met_eireann_warning".into(),
        kind: "met_eireann_warning".into(),
        name: "Met Éireann".into(),
        url: "https://www.met.ie".into(),
        data_url: None,
        latitude: None,
        longitude: None,
        from: None,
        to: None,
        tz: Some("Europe/Dublin".into()),
        country: Some("IE".into()),
        cached_result: Some(summary_path),
    }
}

fn config(providers: Vec<ProviderConfig>) -> Config {
    Config {
        data_dir: data_dir(),
        request_timeout_secs: 5,
        user_agent: "skycast-tests".into(),
        providers,
    }
}

fn irish_address() -> GeoAddress {
    let mut address = GeoAddress::from_lat_lng(53.3411, -6.2898);
    address.country = "IE".into();
    address
}

const FORECAST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<weatherdata created="2023-08-09T12:00:00Z">
  <product class="pointData">
    <time datatype="forecast" from="2023-08-09T15:00:00Z" to="2023-08-09T15:00:00Z">
      <location altitude="43" latitude="53.3411" longitude="-6.2898">
        <temperature id="TTT" unit="celsius" value="16.1"/>
        <windDirection id="dd" deg="288.3" name="W"/>
        <windSpeed id="ff" mps="5.2"/>
        <windGust id="ff_gust" mps="7.9"/>
        <humidity unit="percent" value="72.9"/>
      </location>
    </time>
    <time datatype="forecast" from="2023-08-09T14:00:00Z" to="2023-08-09T15:00:00Z">
      <location>
        <precipitation unit="mm" value="0.4" probability="32.0"/>
        <symbol id="PartCloud" number="3"/>
      </location>
    </time>
    <time datatype="forecast" from="2023-08-09T22:00:00Z" to="2023-08-09T22:00:00Z">
      <location>
        <temperature id="TTT" unit="celsius" value="12.4"/>
        <windDirection id="dd" deg="12.0" name="N"/>
        <windSpeed id="ff" mps="3.4"/>
        <windGust id="ff_gust" mps="5.0"/>
        <humidity unit="percent" value="81.0"/>
      </location>
    </time>
    <time datatype="forecast" from="2023-08-09T21:00:00Z" to="2023-08-09T22:00:00Z">
      <location>
        <precipitation unit="mm" value="0.1" probability="12.0"/>
        <symbol id="DarkLightRainSun" number="105"/>
      </location>
    </time>
  </product>
</weatherdata>"#;

#[tokio::test]
async fn test_forecast_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORECAST_XML))
        .mount(&server)
        .await;

    let config = config(vec![forecast_provider(&server.uri(), None)]);
    let (legends, regions) = load_reference_data(&config.data_dir).unwrap();
    let registry = build_registry(&config, legends, regions).unwrap();

    let forecasts = generate_forecast(&registry, &irish_address(), DateRange::default(), None)
        .await
        .unwrap();

    assert_eq!(forecasts.len(), 1);
    let forecast = &forecasts[0];
    assert_eq!(forecast.provider, "Met Éireann");
    assert!(!forecast.cached);

    // 4 payload blocks merge into 2 entries keyed by end time
    assert_eq!(forecast.time_series.len(), 2);
    let afternoon = &forecast.time_series[0];
    assert_eq!(afternoon.temperature, 16.1);
    assert_eq!(afternoon.precipitation, 0.4);
    assert_eq!(afternoon.precipitation_prob, 32.0);

    // symbol 3 has variants, so it resolves as a day icon
    assert_eq!(afternoon.icon, "img/weather_icons/03d.svg");
    assert_eq!(afternoon.wind_dir_icon, "img/wind_icons/cardinal-w.png");

    // symbol 105 is past the dark offset, so it resolves as night id 5
    let evening = &forecast.time_series[1];
    assert_eq!(evening.icon, "img/weather_icons/05n.svg");
    assert_eq!(evening.wind_dir_icon, "img/wind_icons/cardinal-n.png");

    assert_eq!(forecast.get_units(AttribKey::Temperature), "°C");
    assert_eq!(forecast.get_units(AttribKey::WindSpeed), "m/s");
    assert!(forecast.missing_attribs.is_empty());
}

#[tokio::test]
async fn test_forecast_degrades_on_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config(vec![forecast_provider(&server.uri(), None)]);
    let (legends, regions) = load_reference_data(&config.data_dir).unwrap();
    let registry = build_registry(&config, legends, regions).unwrap();

    let forecasts = generate_forecast(&registry, &irish_address(), DateRange::default(), None)
        .await
        .unwrap();

    assert_eq!(forecasts.len(), 1);
    assert!(forecasts[0].time_series.is_empty());
}

#[tokio::test]
async fn test_forecast_from_cached_response() {
    let dir = tempfile::tempdir().unwrap();
    let cached = dir.path().join("forecast.xml");
    std::fs::File::create(&cached)
        .unwrap()
        .write_all(FORECAST_XML.as_bytes())
        .unwrap();

    let config = config(vec![forecast_provider("https://www.met.ie", Some(cached))]);
    let (legends, regions) = load_reference_data(&config.data_dir).unwrap();
    let registry = build_registry(&config, legends, regions).unwrap();

    let forecasts = generate_forecast(&registry, &irish_address(), DateRange::default(), None)
        .await
        .unwrap();

    assert_eq!(forecasts.len(), 1);
    assert!(forecasts[0].cached);
    assert_eq!(forecasts[0].time_series.len(), 2);
}

fn write_warning_fixtures(dir: &Path) -> PathBuf {
    let summary = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Met Éireann warnings</title>
    <item>
      <title>Small Craft Advisory</title>
      <link>file://alert-marine.xml</link>
      <pubDate>Wed, 09 Aug 2023 10:33:00 GMT</pubDate>
      <category>Marine</category>
    </item>
    <item>
      <title>Wind warning</title>
      <link>file://alert-weather.xml</link>
      <pubDate>Wed, 09 Aug 2023 11:00:00 GMT</pubDate>
      <category>Weather</category>
    </item>
    <item>
      <title>Broken link</title>
      <link>file://missing.xml</link>
      <pubDate>Wed, 09 Aug 2023 11:30:00 GMT</pubDate>
      <category>Weather</category>
    </item>
  </channel>
</rss>"#;

    let marine = r#"<alert>
  <sent>2023-08-09T10:30:00+01:00</sent>
  <msgType>Alert</msgType>
  <info>
    <category>Met</category>
    <event>Small Craft Advisory</event>
    <severity>Minor</severity>
    <onset>2023-08-09T18:00:00+01:00</onset>
    <expires>2023-08-10T06:00:00+01:00</expires>
    <headline>Small craft advisory for Irish coastal waters</headline>
    <parameter>
      <valueName>awareness_level</valueName>
      <value>1; green; Minor</value>
    </parameter>
    <parameter>
      <valueName>awareness_type</valueName>
      <value>1; wind</value>
    </parameter>
    <area>
      <areaDesc>Irish Sea</areaDesc>
      <geocode>
        <valueName>EMMA_ID</valueName>
        <value>EI805</value>
      </geocode>
    </area>
  </info>
</alert>"#;

    let weather = r#"<alert>
  <sent>2023-08-09T11:00:00+01:00</sent>
  <msgType>Alert</msgType>
  <info>
    <category>Met</category>
    <event>Wind warning</event>
    <severity>Moderate</severity>
    <headline>Status Yellow - Wind warning for Dublin</headline>
    <parameter>
      <valueName>awareness_level</valueName>
      <value>2; yellow; Moderate</value>
    </parameter>
    <parameter>
      <valueName>awareness_type</valueName>
      <value>1; wind</value>
    </parameter>
    <area>
      <areaDesc>Dublin</areaDesc>
      <geocode>
        <valueName>FIPS_ID</valueName>
        <value>EI07</value>
      </geocode>
    </area>
  </info>
</alert>"#;

    for (name, contents) in [
        ("warnings.xml", summary),
        ("alert-marine.xml", marine),
        ("alert-weather.xml", weather),
    ] {
        std::fs::File::create(dir.join(name))
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
    }
    dir.join("warnings.xml")
}

#[tokio::test]
async fn test_warnings_from_cached_replay() {
    let dir = tempfile::tempdir().unwrap();
    let summary_path = write_warning_fixtures(dir.path());

    let config = config(vec![warning_provider(summary_path)]);
    let (legends, regions) = load_reference_data(&config.data_dir).unwrap();
    let registry = build_registry(&config, legends, regions).unwrap();

    let all = generate_warnings(&registry, "IE", None).await.unwrap();
    assert_eq!(all.len(), 1);

    let warnings = &all[0];
    assert!(warnings.cached);
    assert_eq!(warnings.provider_id, "met_eireann_warning");
    // the item with the unreadable detail link is skipped, not fatal
    assert_eq!(warnings.warnings.len(), 2);

    let marine = &warnings.warnings[0];
    // summary category overrides the detail document's "Met"
    assert_eq!(marine.category, Category::Marine);
    assert!(marine.is_small_craft());
    assert_eq!(marine.icon, "img/warning_icons/icons8-boat-90-green.png");
    assert_eq!(
        marine.areas,
        vec!["The Irish Sea from Carnsore Point to Fair Head"]
    );

    let weather = &warnings.warnings[1];
    assert_eq!(weather.category, Category::Weather);
    assert_eq!(weather.severity, Severity::Moderate);
    assert_eq!(weather.icon, "img/warning_icons/icons8-warning-96-yellow.png");
    assert_eq!(weather.areas, vec!["Dublin"]);

    assert_eq!(warnings.highest_severity(Category::Marine), Some(Severity::Minor));
    assert_eq!(warnings.highest_severity(Category::Weather), Some(Severity::Moderate));
    assert_eq!(warnings.highest_severity(Category::Environmental), None);
}

#[tokio::test]
async fn test_warnings_live_fetch() {
    let server = MockServer::start().await;
    let detail_url = format!("{}/alert-1.xml", server.uri());

    let summary = format!(
        r#"<rss version="2.0"><channel><item>
  <title>Wind warning</title>
  <link>{detail_url}</link>
  <pubDate>Wed, 09 Aug 2023 11:00:00 GMT</pubDate>
  <category>Weather</category>
</item></channel></rss>"#
    );
    let alert = r#"<alert>
  <msgType>Alert</msgType>
  <info>
    <category>Met</category>
    <event>Wind warning</event>
    <severity>Severe</severity>
    <parameter>
      <valueName>awareness_level</valueName>
      <value>3; orange; Severe</value>
    </parameter>
  </info>
</alert>"#;

    Mock::given(method("GET"))
        .and(path("/warnings"))
        .respond_with(ResponseTemplate::new(200).set_body_string(summary))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alert-1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(alert))
        .mount(&server)
        .await;

    let mut provider = warning_provider(PathBuf::new());
    provider.cached_result = None;
    provider.data_url = Some(format!("{}/warnings", server.uri()));

    let config = config(vec![provider]);
    let (legends, regions) = load_reference_data(&config.data_dir).unwrap();
    let registry = build_registry(&config, legends, regions).unwrap();

    let all = generate_warnings(&registry, "IE", None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(!all[0].cached);
    assert_eq!(all[0].warnings.len(), 1);
    assert_eq!(all[0].warnings[0].severity, Severity::Severe);
    // no detail sent timestamp, so the summary published date is used
    assert_eq!(
        all[0].warnings[0].sent.map(|dt| dt.to_rfc3339()),
        Some("2023-08-09T11:00:00+00:00".into())
    );
}

#[tokio::test]
async fn test_unknown_provider_kind_is_fatal() {
    let mut provider = forecast_provider("https://www.met.ie", None);
    provider.kind = "locationforecast_mars".into();

    let config = config(vec![provider]);
    let (legends, regions) = load_reference_data(&config.data_dir).unwrap();
    assert!(build_registry(&config, legends, regions).is_err());
}

#[tokio::test]
async fn test_shipped_reference_data_loads() {
    let (legends, regions) = load_reference_data(&data_dir()).unwrap();

    // base legends, patch aliases and dark variants are all reachable
    assert!(legends.key_exists("1"));
    assert!(legends.key_exists("105"));
    assert!(legends.key_exists("sun_night"));
    assert!(legends.key_exists("clearsky_day"));

    assert!(regions.key_exists("EI805"));
    assert!(regions.key_exists("EI07"));
}
