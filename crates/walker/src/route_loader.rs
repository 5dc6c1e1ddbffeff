//! Route loading from config values and route files.
//!
//! Supported sources:
//! - inline `walk_path` pairs from `config.json`
//! - GPX 1.1 files (`<wpt>` elements, document order)
//! - JSON arrays of `[lat, lon]` pairs
//! - path-list files binding `WALK_PATH` to a bracketed list of `(lat, lon)`
//!   tuples; the list literal is parsed, nothing is executed

use std::path::{Path, PathBuf};

use gpx::{Gpx, GpxVersion, Waypoint as GpxWaypoint};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigStore, WalkerConfig};
use crate::errors::WalkerError;
use crate::models::{Offset, Route, Waypoint};

/// Default tolerance (degrees) for collapsing adjacent duplicates.
pub const DEFAULT_TOLERANCE_DEG: f64 = 1e-6;

/// Symbol a path-list file must bind.
pub const PATH_LIST_SYMBOL: &str = "WALK_PATH";

/// Route file picked up when the config names none.
pub const DEFAULT_ROUTE_FILE: &str = "run.gpx";

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GPX parse error: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Route file does not exist: {0}")]
    MissingFile(PathBuf),
    #[error("Unsupported route file type: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Route has no points")]
    Empty,
    #[error("Route needs at least 2 distinct points, got {0}")]
    TooFewPoints(usize),
    #[error("Route has zero length")]
    ZeroLength,
    #[error("Point {index} is invalid: {reason}")]
    InvalidPoint { index: usize, reason: String },
    #[error("{symbol} not found in {path}")]
    MissingSymbol { symbol: &'static str, path: PathBuf },
    #[error("Malformed path list: {0}")]
    PathList(String),
    #[error("No route configured: set walk_path or walk_path_file")]
    NotConfigured,
}

/// Where a route comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteSource {
    Inline(Vec<Waypoint>),
    Gpx(PathBuf),
    Json(PathBuf),
    PathList(PathBuf),
}

impl RouteSource {
    /// Picks the file kind from the extension. The file must exist.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, RouteError> {
        let path = path.into();
        if !path.is_file() {
            return Err(RouteError::MissingFile(path));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("gpx") => Ok(Self::Gpx(path)),
            Some("json") => Ok(Self::Json(path)),
            Some("py") | Some("txt") => Ok(Self::PathList(path)),
            _ => Err(RouteError::UnsupportedFormat(path)),
        }
    }

    /// Resolves the route source named by the config.
    ///
    /// Precedence: non-empty inline `walk_path`, then `walk_path_file`, then
    /// [`DEFAULT_ROUTE_FILE`] next to the config.
    pub fn from_config(config: &WalkerConfig, store: &ConfigStore) -> Result<Self, RouteError> {
        if let Some(values) = &config.walk_path
            && !values.is_empty()
        {
            let points = values
                .iter()
                .enumerate()
                .map(|(index, value)| coerce_pair(index, value))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Inline(points));
        }

        if let Some(file) = &config.walk_path_file {
            return Self::from_file(store.resolve_path(file));
        }

        let fallback = store.resolve_path(DEFAULT_ROUTE_FILE);
        if fallback.is_file() {
            return Ok(Self::Gpx(fallback));
        }

        Err(RouteError::NotConfigured)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Inline(_) => None,
            Self::Gpx(p) | Self::Json(p) | Self::PathList(p) => Some(p),
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Inline(_) => "config.json walk_path".to_string(),
            Self::Gpx(p) | Self::Json(p) | Self::PathList(p) => p.display().to_string(),
        }
    }
}

/// A loaded route together with the offset and the source it came from.
#[derive(Debug, Clone)]
pub struct LoadedRoute {
    pub route: Route,
    pub offset: Offset,
    pub source: RouteSource,
}

/// Loads routes, collapsing adjacent duplicates and optionally thinning them.
#[derive(Debug, Clone)]
pub struct RouteLoader {
    tolerance: f64,
    stride: Option<usize>,
}

impl Default for RouteLoader {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE_DEG,
            stride: None,
        }
    }
}

impl RouteLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duplicate tolerance in degrees.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Keeps every `stride`-th point (the final point is always kept).
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }

    /// Loads a route from a source.
    pub fn load(&self, source: &RouteSource) -> Result<Route, RouteError> {
        let raw = match source {
            RouteSource::Inline(points) => points.clone(),
            RouteSource::Gpx(path) => load_gpx_file(path)?,
            RouteSource::Json(path) => parse_json_pairs(&std::fs::read_to_string(path)?)?,
            RouteSource::PathList(path) => {
                let text = std::fs::read_to_string(path)?;
                parse_path_list(&text).map_err(|e| match e {
                    RouteError::MissingSymbol { symbol, .. } => RouteError::MissingSymbol {
                        symbol,
                        path: path.clone(),
                    },
                    other => other,
                })?
            }
        };

        if raw.is_empty() {
            return Err(RouteError::Empty);
        }

        let raw_count = raw.len();
        let mut points = remove_duplicates(&raw, self.tolerance);
        if let Some(stride) = self.stride {
            points = simplify(&points, stride);
        }
        debug!(
            "Loaded {} raw points, {} after cleanup from {}",
            raw_count,
            points.len(),
            source.describe()
        );

        Route::new(points)
    }

    /// Resolves the route and offset from the config and loads the route.
    pub fn load_from_config(
        &self,
        config: &WalkerConfig,
        store: &ConfigStore,
    ) -> Result<LoadedRoute, WalkerError> {
        let offset = config.offset()?;
        let source = RouteSource::from_config(config, store)?;
        let route = self.load(&source)?;

        info!(
            "Loaded route from {}: {} points, lap {:.1} m",
            source.describe(),
            route.len(),
            route.lap_length_m()
        );

        Ok(LoadedRoute {
            route,
            offset,
            source,
        })
    }
}

/// Collapses runs of adjacent points within `tolerance`, keeping the first.
pub fn remove_duplicates(points: &[Waypoint], tolerance: f64) -> Vec<Waypoint> {
    let mut result: Vec<Waypoint> = Vec::with_capacity(points.len());
    for point in points {
        match result.last() {
            Some(prev) if prev.within(point, tolerance) => {}
            _ => result.push(*point),
        }
    }
    result
}

/// Keeps indices `0, stride, 2*stride, ..` plus the final point.
///
/// A stride of 0 or 1 returns the input unchanged.
pub fn simplify(points: &[Waypoint], stride: usize) -> Vec<Waypoint> {
    if stride <= 1 || points.is_empty() {
        return points.to_vec();
    }

    let mut result: Vec<Waypoint> = points.iter().step_by(stride).copied().collect();
    if (points.len() - 1) % stride != 0
        && let Some(last) = points.last()
    {
        result.push(*last);
    }
    result
}

/// Reads `<wpt>` elements from a GPX file.
pub fn load_gpx_file(path: impl AsRef<Path>) -> Result<Vec<Waypoint>, RouteError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let gpx: Gpx = gpx::read(reader)?;
    Ok(extract_waypoints(&gpx))
}

/// Reads `<wpt>` elements from GPX data in memory.
pub fn load_gpx_bytes(data: &[u8]) -> Result<Vec<Waypoint>, RouteError> {
    let gpx: Gpx = gpx::read(std::io::Cursor::new(data))?;
    Ok(extract_waypoints(&gpx))
}

fn extract_waypoints(gpx: &Gpx) -> Vec<Waypoint> {
    gpx.waypoints
        .iter()
        .map(|wpt| {
            let point = wpt.point();
            Waypoint::new(point.y(), point.x())
        })
        .collect()
}

/// Parses a JSON array of `[lat, lon]` pairs.
pub fn parse_json_pairs(text: &str) -> Result<Vec<Waypoint>, RouteError> {
    let values: Vec<Value> = serde_json::from_str(text)?;
    values
        .iter()
        .enumerate()
        .map(|(index, value)| coerce_pair(index, value))
        .collect()
}

/// Coerces a JSON value into a waypoint; it must hold exactly two numbers.
pub fn coerce_pair(index: usize, value: &Value) -> Result<Waypoint, RouteError> {
    let invalid = |reason: String| RouteError::InvalidPoint { index, reason };

    let items = value
        .as_array()
        .ok_or_else(|| invalid(format!("expected [lat, lon], got {value}")))?;
    if items.len() != 2 {
        return Err(invalid(format!("expected 2 components, got {}", items.len())));
    }

    let number = |v: &Value| match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(format!("{n} is not a float"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(format!("{s:?} is not a finite number"))),
        other => Err(invalid(format!("{other} is not a number"))),
    };

    Ok(Waypoint::new(number(&items[0])?, number(&items[1])?))
}

/// Parses a path-list file: finds `WALK_PATH`, skips an optional type
/// annotation, and reads the bracketed list of pairs after `=`.
///
/// `#` starts a comment that runs to the end of the line.
pub fn parse_path_list(text: &str) -> Result<Vec<Waypoint>, RouteError> {
    let text: String = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");

    let body = find_binding(&text).ok_or(RouteError::MissingSymbol {
        symbol: PATH_LIST_SYMBOL,
        path: PathBuf::new(),
    })?;

    let inner = bracketed(body)?;
    split_top_level(inner)
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .enumerate()
        .map(|(index, item)| parse_tuple(index, item))
        .collect()
}

/// Returns the text after `=` in the first `WALK_PATH [: type] = ...` binding.
fn find_binding(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(pos) = text[search_from..].find(PATH_LIST_SYMBOL) {
        let start = search_from + pos;
        let end = start + PATH_LIST_SYMBOL.len();
        search_from = end;

        let at_line_start = text[..start]
            .chars()
            .rev()
            .take_while(|c| *c != '\n')
            .all(char::is_whitespace);
        let rest = &text[end..];
        let next = rest.trim_start_matches([' ', '\t']).chars().next();
        if at_line_start && matches!(next, Some(':') | Some('=')) {
            return rest.find('=').map(|eq| &rest[eq + 1..]);
        }
    }
    None
}

/// Returns the contents of the first balanced `[...]` in `text`.
fn bracketed(text: &str) -> Result<&str, RouteError> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('[') {
        return Err(RouteError::PathList("expected '[' after '='".into()));
    }

    let mut depth = 0usize;
    for (i, c) in trimmed.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| RouteError::PathList("unbalanced brackets".into()))?;
                if depth == 0 {
                    return Ok(&trimmed[1..i]);
                }
            }
            _ => {}
        }
    }
    Err(RouteError::PathList("unterminated list".into()))
}

/// Splits on commas that are not nested inside brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_tuple(index: usize, item: &str) -> Result<Waypoint, RouteError> {
    let invalid = |reason: String| RouteError::InvalidPoint { index, reason };

    let inner = item
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .or_else(|| item.strip_prefix('[').and_then(|s| s.strip_suffix(']')))
        .ok_or_else(|| invalid(format!("expected (lat, lon), got {item:?}")))?;

    let components: Vec<&str> = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if components.len() != 2 {
        return Err(invalid(format!(
            "expected 2 components, got {}",
            components.len()
        )));
    }

    let number = |s: &str| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(format!("{s:?} is not a finite number")))
    };
    Ok(Waypoint::new(number(components[0])?, number(components[1])?))
}

/// Formats points as a path-list file.
pub fn format_path_list(points: &[Waypoint]) -> String {
    let mut out = format!("{PATH_LIST_SYMBOL}: List[Tuple[float, float]] = [\n");
    for (i, p) in points.iter().enumerate() {
        let comma = if i + 1 < points.len() { "," } else { "" };
        out.push_str(&format!("    ({:?}, {:?}){comma}\n", p.lat, p.lon));
    }
    out.push_str("]\n");
    out
}

/// Formats points as a JSON array of `[lat, lon]` pairs.
pub fn format_json_pairs(points: &[Waypoint]) -> Result<String, RouteError> {
    let pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.lat, p.lon]).collect();
    Ok(serde_json::to_string_pretty(&pairs)?)
}

/// Writes points as GPX 1.1 waypoints.
pub fn write_gpx_file(
    path: impl AsRef<Path>,
    points: &[Waypoint],
    name: Option<&str>,
) -> Result<(), RouteError> {
    let waypoints: Vec<GpxWaypoint> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut wpt = GpxWaypoint::new(p.point());
            wpt.name = name.map(|n| format!("{n} {}", i + 1));
            wpt
        })
        .collect();

    let gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("route-walker".to_string()),
        waypoints,
        ..Default::default()
    };

    let file = std::fs::File::create(path)?;
    gpx::write(&gpx, file)?;
    Ok(())
}

/// Writes a route file, choosing the format from the extension.
pub fn write_route_file(path: impl AsRef<Path>, points: &[Waypoint]) -> Result<(), RouteError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("gpx") => write_gpx_file(path, points, Some("Point")),
        Some("json") => Ok(std::fs::write(path, format_json_pairs(points)?)?),
        Some("py") | Some("txt") => Ok(std::fs::write(path, format_path_list(points))?),
        _ => Err(RouteError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wp(lat: f64, lon: f64) -> Waypoint {
        Waypoint::new(lat, lon)
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("walker-route-{}-{name}", std::process::id()))
    }

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="30.3082887" lon="120.0783378"><name>a</name></wpt>
  <wpt lat="30.3082887" lon="120.0783378"><name>dup</name></wpt>
  <wpt lat="30.3082916" lon="120.0783646"/>
  <wpt lat="30.3082829" lon="120.0784317"/>
</gpx>"#;

    #[test]
    fn test_remove_duplicates() {
        let points = vec![
            wp(0.0, 0.0),
            wp(0.0, 0.0),
            wp(1.0, 1.0),
            wp(1.0, 1.0),
            wp(1.0, 1.0),
            wp(2.0, 2.0),
        ];
        assert_eq!(
            remove_duplicates(&points, DEFAULT_TOLERANCE_DEG),
            vec![wp(0.0, 0.0), wp(1.0, 1.0), wp(2.0, 2.0)]
        );
    }

    #[test]
    fn test_remove_duplicates_keeps_first_seen() {
        let points = vec![wp(0.0, 0.0), wp(0.0000005, 0.0000005), wp(0.0, 0.0)];
        // Each neighbour is within tolerance of the retained first point
        assert_eq!(remove_duplicates(&points, DEFAULT_TOLERANCE_DEG), vec![wp(0.0, 0.0)]);
    }

    #[test]
    fn test_simplify_keeps_last() {
        let points: Vec<Waypoint> = (0..7).map(|i| wp(i as f64, 0.0)).collect();
        let simplified = simplify(&points, 3);
        assert_eq!(simplified, vec![wp(0.0, 0.0), wp(3.0, 0.0), wp(6.0, 0.0)]);

        let simplified = simplify(&points, 4);
        assert_eq!(simplified, vec![wp(0.0, 0.0), wp(4.0, 0.0), wp(6.0, 0.0)]);

        assert_eq!(simplify(&points, 1), points);
    }

    #[test]
    fn test_coerce_pair() {
        assert_eq!(coerce_pair(0, &json!([1.5, 2])).unwrap(), wp(1.5, 2.0));
        assert_eq!(coerce_pair(0, &json!(["1.5", "2"])).unwrap(), wp(1.5, 2.0));
        assert!(matches!(
            coerce_pair(3, &json!([1.0])),
            Err(RouteError::InvalidPoint { index: 3, .. })
        ));
        assert!(coerce_pair(0, &json!([1.0, 2.0, 3.0])).is_err());
        assert!(coerce_pair(0, &json!([1.0, null])).is_err());
        assert!(coerce_pair(0, &json!({"lat": 1.0, "lon": 2.0})).is_err());
    }

    #[test]
    fn test_parse_json_pairs() {
        let points = parse_json_pairs("[[30.1, 120.2], [30.2, 120.3]]").unwrap();
        assert_eq!(points, vec![wp(30.1, 120.2), wp(30.2, 120.3)]);
        assert!(parse_json_pairs("[[30.1, 120.2], [30.2]]").is_err());
        assert!(parse_json_pairs("{}").is_err());
    }

    #[test]
    fn test_parse_path_list() {
        let text = r#"from typing import List, Tuple

# exported route
WALK_PATH: List[Tuple[float, float]] = [
    (30.308288766029804, 120.07833785355666),  # start
    (30.308291661538462, 120.078364684865),
    [30.308282975010897, 120.07843176313679],
]
"#;
        let points = parse_path_list(text).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], wp(30.308288766029804, 120.07833785355666));
        assert_eq!(points[2], wp(30.308282975010897, 120.07843176313679));
    }

    #[test]
    fn test_parse_path_list_errors() {
        assert!(matches!(
            parse_path_list("OTHER = [(1, 2)]"),
            Err(RouteError::MissingSymbol { .. })
        ));
        // Mentioned but not bound at line start
        assert!(matches!(
            parse_path_list("print(WALK_PATH)"),
            Err(RouteError::MissingSymbol { .. })
        ));
        assert!(matches!(
            parse_path_list("WALK_PATH = [(1, 2, 3)]"),
            Err(RouteError::InvalidPoint { index: 0, .. })
        ));
        assert!(matches!(
            parse_path_list("WALK_PATH = [(1, 2)"),
            Err(RouteError::PathList(_))
        ));
        assert!(matches!(
            parse_path_list("WALK_PATH = load()"),
            Err(RouteError::PathList(_))
        ));
    }

    #[test]
    fn test_path_list_format_parses_back() {
        let points = vec![wp(30.1, 120.2), wp(30.25, 120.125)];
        assert_eq!(parse_path_list(&format_path_list(&points)).unwrap(), points);
    }

    #[test]
    fn test_load_gpx_bytes_in_document_order() {
        let points = load_gpx_bytes(SAMPLE_GPX.as_bytes()).unwrap();
        assert_eq!(points.len(), 4);
        assert!((points[0].lat - 30.3082887).abs() < 1e-9);
        assert!((points[0].lon - 120.0783378).abs() < 1e-9);
        assert!((points[3].lon - 120.0784317).abs() < 1e-9);
    }

    #[test]
    fn test_loader_collapses_gpx_duplicates() {
        let path = temp_path("sample.gpx");
        std::fs::write(&path, SAMPLE_GPX).unwrap();

        let source = RouteSource::from_file(&path).unwrap();
        assert!(matches!(source, RouteSource::Gpx(_)));
        let route = RouteLoader::new().load(&source).unwrap();
        assert_eq!(route.len(), 3);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_from_file_errors() {
        assert!(matches!(
            RouteSource::from_file(temp_path("does-not-exist.gpx")),
            Err(RouteError::MissingFile(_))
        ));

        let path = temp_path("route.csv");
        std::fs::write(&path, "1,2").unwrap();
        assert!(matches!(
            RouteSource::from_file(&path),
            Err(RouteError::UnsupportedFormat(_))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_loader_rejects_empty_and_single_point() {
        let loader = RouteLoader::new();
        assert!(matches!(
            loader.load(&RouteSource::Inline(vec![])),
            Err(RouteError::Empty)
        ));
        assert!(matches!(
            loader.load(&RouteSource::Inline(vec![wp(1.0, 1.0), wp(1.0, 1.0)])),
            Err(RouteError::TooFewPoints(1))
        ));
    }

    #[test]
    fn test_from_config_precedence() {
        let dir = temp_path("cfg");
        std::fs::create_dir_all(&dir).unwrap();
        let store = ConfigStore::new(dir.join("config.json"));
        std::fs::write(dir.join("route.json"), "[[1.0, 2.0], [1.1, 2.1]]").unwrap();

        let mut config = WalkerConfig {
            walk_path: Some(vec![json!([5.0, 6.0]), json!([5.1, 6.1])]),
            walk_path_file: Some("route.json".into()),
            ..Default::default()
        };
        assert_eq!(
            RouteSource::from_config(&config, &store).unwrap(),
            RouteSource::Inline(vec![wp(5.0, 6.0), wp(5.1, 6.1)])
        );

        config.walk_path = Some(vec![]);
        assert_eq!(
            RouteSource::from_config(&config, &store).unwrap(),
            RouteSource::Json(dir.join("route.json"))
        );

        config.walk_path_file = None;
        assert!(matches!(
            RouteSource::from_config(&config, &store),
            Err(RouteError::NotConfigured)
        ));

        std::fs::write(dir.join(DEFAULT_ROUTE_FILE), SAMPLE_GPX).unwrap();
        assert_eq!(
            RouteSource::from_config(&config, &store).unwrap(),
            RouteSource::Gpx(dir.join(DEFAULT_ROUTE_FILE))
        );

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_write_gpx_round_trip() {
        let path = temp_path("written.gpx");
        let points = vec![wp(40.0, -105.3), wp(40.01, -105.29)];
        write_route_file(&path, &points).unwrap();

        let loaded = load_gpx_file(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!((loaded[1].lat - 40.01).abs() < 1e-9);

        std::fs::remove_file(path).ok();
    }
}
