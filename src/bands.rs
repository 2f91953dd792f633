/// Band registry for the Sentinel-2 scene selection service.
///
/// Defines the canonical set of bands this service touches, along with their
/// native resolution and which collection serves them. This is the single
/// source of truth for band identifiers — all other modules should reference
/// bands from here rather than hardcoding strings in request bodies.

// ---------------------------------------------------------------------------
// Band identifiers (re-used in reduction and export request construction)
// ---------------------------------------------------------------------------

/// Red band of the surface-reflectance product (665 nm).
pub const BAND_RED: &str = "B04";

/// Green band of the surface-reflectance product (560 nm).
pub const BAND_GREEN: &str = "B03";

/// Blue band of the surface-reflectance product (490 nm).
pub const BAND_BLUE: &str = "B02";

/// Per-pixel cloud probability band, 0–100, served by the cloud-probability
/// collection rather than the imagery collection.
pub const BAND_CLOUD_PROB: &str = "probability";

/// Band whose mask determines the valid-pixel fraction. Red is present in
/// every granule and masked wherever the sensor had no data.
pub const REFERENCE_BAND: &str = BAND_RED;

// ---------------------------------------------------------------------------
// Band metadata
// ---------------------------------------------------------------------------

/// Which catalog collection a band is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSource {
    /// The surface-reflectance imagery collection.
    Imagery,
    /// The paired cloud-probability collection.
    CloudProbability,
}

/// Metadata for a single band used by this service.
pub struct Band {
    /// Band identifier as the platform expects it in request bodies.
    pub id: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Native ground sampling distance in meters.
    pub resolution_m: u32,
    /// Which collection serves this band.
    pub source: BandSource,
}

/// All bands referenced by reduction, rendering, and export requests.
pub static BAND_REGISTRY: &[Band] = &[
    Band {
        id: BAND_RED,
        description: "Red surface reflectance, 665 nm. Also the reference \
                      band for valid-pixel accounting.",
        resolution_m: 10,
        source: BandSource::Imagery,
    },
    Band {
        id: BAND_GREEN,
        description: "Green surface reflectance, 560 nm.",
        resolution_m: 10,
        source: BandSource::Imagery,
    },
    Band {
        id: BAND_BLUE,
        description: "Blue surface reflectance, 490 nm.",
        resolution_m: 10,
        source: BandSource::Imagery,
    },
    Band {
        id: BAND_CLOUD_PROB,
        description: "s2cloudless per-pixel cloud probability, 0-100.",
        resolution_m: 10,
        source: BandSource::CloudProbability,
    },
];

/// The RGB triple used for 8-bit visualization, in red-green-blue order as
/// the rendering endpoint expects it.
pub fn rgb_bands() -> [&'static str; 3] {
    [BAND_RED, BAND_GREEN, BAND_BLUE]
}

/// Looks up a band by identifier. Returns `None` if not found.
pub fn find_band(id: &str) -> Option<&'static Band> {
    BAND_REGISTRY.iter().find(|b| b.id == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
