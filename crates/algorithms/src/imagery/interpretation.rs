//! Human-readable interpretation guides for each index

use super::indices::SpectralIndex;

/// Text returned for names outside the catalog.
pub const INTERPRETATION_UNAVAILABLE: &str = "\
Interpretation not available for this index.
Please select another index from the catalog.";

/// Interpretation guide for `index`.
pub fn interpretation(index: SpectralIndex) -> &'static str {
    match index {
        SpectralIndex::NDVI => "\
- Range: -1 to 1
- Used for: Measuring vegetation health and density
- < 0: Water, bare soil, or clouds
- 0-0.2: Barren areas, rock, sand, or snow
- 0.2-0.4: Shrubs and grassland
- 0.4-0.6: Moderate vegetation
- > 0.6: Dense vegetation, crops at peak growth

NDVI is particularly useful for monitoring crop health throughout the growing season.",
        SpectralIndex::SAVI => "\
- Range: -1 to 1
- Used for: Vegetation analysis in areas with high soil exposure
- < 0: Water, bare soil, or clouds
- 0-0.2: Very sparse vegetation
- 0.2-0.4: Sparse vegetation
- 0.4-0.6: Moderate vegetation
- > 0.6: Dense vegetation

SAVI is particularly useful in areas where soil exposure might affect NDVI readings.",
        SpectralIndex::VARI => "\
- Range: Generally -1 to 1
- Used for: Vegetation analysis using only visible light bands
- < 0: Stressed or senescent vegetation
- 0-0.1: Bare soil or very sparse vegetation
- 0.1-0.3: Moderate vegetation health
- > 0.3: Healthy vegetation

VARI is particularly useful for analyzing vegetation in RGB imagery and is less sensitive to atmospheric effects.",
        SpectralIndex::MNDWI => "\
- Range: -1 to 1
- Used for: Detecting water bodies and moisture content
- > 0: Water bodies
- 0 to -0.2: Built-up areas and bare soil
- < -0.2: Vegetation

MNDWI is excellent for distinguishing water features and assessing soil moisture conditions.",
        SpectralIndex::NDMI => "\
- Range: -1 to 1
- Used for: Vegetation water content assessment
- < 0: Water stress or low moisture content
- 0-0.2: Moderate moisture content
- > 0.2: High moisture content

NDMI is particularly useful for monitoring drought conditions and irrigation needs.",
        SpectralIndex::CMR => "\
- Used for: Assessing both chlorophyll content and moisture stress
- Higher values indicate better plant health
- Lower values may indicate stress conditions

CMR combines information about chlorophyll content and moisture stress in vegetation.",
        SpectralIndex::FMR => "\
- Used for: Detecting floating vegetation in water bodies
- Higher values indicate presence of floating vegetation
- Lower values indicate clear water or other surfaces

FMR is particularly useful for monitoring aquatic vegetation and water quality.",
        SpectralIndex::EVI => "\
- Range: -1 to 1
- Used for: Improved vegetation monitoring
- < 0: Non-vegetated areas
- 0-0.2: Sparse vegetation
- 0.2-0.5: Moderate vegetation
- > 0.5: Dense vegetation

EVI improves upon NDVI by being more sensitive to canopy structural variations.",
        SpectralIndex::NBR => "\
- Range: -1 to 1
- Used for: Identifying burned areas and severity
- < -0.2: High severity burn
- -0.2 to -0.1: Moderate severity burn
- -0.1 to 0.1: Low severity or unburned
- > 0.1: Healthy vegetation

NBR is particularly useful for post-fire monitoring and recovery assessment.",
        SpectralIndex::GCI => "\
- Used for: Estimating chlorophyll content
- < 0: Stressed vegetation
- 0-1: Moderate chlorophyll content
- > 1: High chlorophyll content, healthy vegetation

GCI is particularly useful for monitoring crop nutrition and health status.",
        SpectralIndex::TCARI => "\
- Used for: Precise chlorophyll content estimation
- Higher values: Lower chlorophyll content
- Lower values: Higher chlorophyll content

TCARI is less sensitive to leaf layering effects than other chlorophyll indices.",
        SpectralIndex::BAI => "\
- Used for: Highlighting recently burned areas
- Higher values: Recently burned areas
- Lower values: Unburned vegetation or other surfaces

BAI is particularly useful for fire damage assessment and monitoring.",
        SpectralIndex::OSAVI => "\
- Range: -1 to 1
- Used for: Vegetation monitoring with soil brightness correction
- < 0.2: Bare soil or very sparse vegetation
- 0.2-0.5: Moderate vegetation coverage
- > 0.5: Dense vegetation

OSAVI optimizes the soil adjustment factor for most agricultural conditions.",
    }
}

/// Look up a guide by short or full name; unknown names get
/// [`INTERPRETATION_UNAVAILABLE`].
pub fn interpretation_for_name(name: &str) -> &'static str {
    name.parse::<SpectralIndex>()
        .map(interpretation)
        .unwrap_or(INTERPRETATION_UNAVAILABLE)
}
