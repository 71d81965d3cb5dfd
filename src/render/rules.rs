//! Declarative renderer tables.
//!
//! Enumerated tags map integer codes (or single letters) to labels; the
//! remaining tags point at a formula from [`super::format`].

use super::format as f;
use super::Rule;

const UNKNOWN: Option<&str> = Some("Unknown");

const fn lookup(labels: &'static [(i64, &'static str)]) -> Rule {
    Rule::Lookup {
        labels,
        default: UNKNOWN,
    }
}

const fn letters(labels: &'static [(&'static str, &'static str)]) -> Rule {
    Rule::Letter {
        labels,
        default: UNKNOWN,
        ignore_case: true,
    }
}

// =============================================================================
// Label tables
// =============================================================================

const COMPRESSION: &[(i64, &str)] = &[
    (1, "Uncompressed"),
    (2, "CCITT 1D"),
    (3, "T4/Group 3 Fax"),
    (4, "T6/Group 4 Fax"),
    (5, "LZW"),
    (6, "JPEG (old-style)"),
    (7, "JPEG"),
    (8, "Adobe Deflate"),
    (9, "JBIG B&W"),
    (10, "JBIG Color"),
    (99, "JPEG"),
    (262, "Kodak 262"),
    (32766, "Next"),
    (32767, "Sony ARW Compressed"),
    (32769, "Packed RAW"),
    (32770, "Samsung SRW Compressed"),
    (32771, "CCIRLEW"),
    (32773, "PackBits"),
    (32809, "Thunderscan"),
    (32867, "Kodak KDC Compressed"),
    (32895, "IT8CTPAD"),
    (32896, "IT8LW"),
    (32897, "IT8MP"),
    (32898, "IT8BL"),
    (32908, "PixarFilm"),
    (32909, "PixarLog"),
    (32946, "Deflate"),
    (32947, "DCS"),
    (34661, "JBIG"),
    (34676, "SGILog"),
    (34677, "SGILog24"),
    (34712, "JPEG 2000"),
    (34713, "Nikon NEF Compressed"),
    (34715, "JBIG2 TIFF FX"),
    (34718, "Microsoft Document Imaging (MDI) Binary Level Codec"),
    (34719, "Microsoft Document Imaging (MDI) Progressive Transform Codec"),
    (34720, "Microsoft Document Imaging (MDI) Vector"),
    (65000, "Kodak DCR Compressed"),
    (65535, "Pentax PEF Compressed"),
];

const PHOTOMETRIC_INTERPRETATION: &[(i64, &str)] = &[
    (0, "WhiteIsZero"),
    (1, "BlackIsZero"),
    (2, "RGB"),
    (3, "RGB Palette"),
    (4, "Transparency Mask"),
    (5, "CMYK"),
    (6, "YCbCr"),
    (8, "CIELab"),
    (9, "ICCLab"),
    (10, "ITULab"),
    (32803, "Color Filter Array"),
    (32844, "Pixar LogL"),
    (32845, "Pixar LogLuv"),
    (34892, "Linear Raw"),
];

const THRESHOLDING: &[(i64, &str)] = &[
    (1, "No dithering or halftoning"),
    (2, "Ordered dither or halftone"),
    (3, "Randomized dither"),
];

const FILL_ORDER: &[(i64, &str)] = &[(1, "Normal"), (2, "Reversed")];

const ORIENTATION: &[(i64, &str)] = &[
    (1, "Horizontal (normal)"),
    (2, "Mirror horizontal"),
    (3, "Rotate 180"),
    (4, "Mirror vertical"),
    (5, "Mirror horizontal and rotate 270 CW"),
    (6, "Rotate 90 CW"),
    (7, "Mirror horizontal and rotate 90 CW"),
    (8, "Rotate 270 CW"),
];

const PLANAR_CONFIGURATION: &[(i64, &str)] = &[(1, "Chunky"), (2, "Planar")];

const GRAY_RESPONSE_UNIT: &[(i64, &str)] = &[
    (1, "0.1"),
    (2, "0.001"),
    (3, "0.0001"),
    (4, "1e-05"),
    (5, "1e-06"),
];

const RESOLUTION_UNIT: &[(i64, &str)] = &[(1, "None"), (2, "inches"), (3, "cm")];

const FOCAL_PLANE_RESOLUTION_UNIT: &[(i64, &str)] =
    &[(1, "None"), (2, "inches"), (3, "cm"), (4, "mm"), (5, "um")];

const PREDICTOR: &[(i64, &str)] = &[(1, "None"), (2, "Horizontal differencing")];

const INK_SET: &[(i64, &str)] = &[(1, "CMYK"), (2, "Not CMYK")];

const YCBCR_POSITIONING: &[(i64, &str)] = &[(1, "Centered"), (2, "Co-sited")];

const EXPOSURE_PROGRAM: &[(i64, &str)] = &[
    (0, "Not Defined"),
    (1, "Manual"),
    (2, "Program AE"),
    (3, "Aperture-priority AE"),
    (4, "Shutter speed priority AE"),
    (5, "Creative (Slow speed)"),
    (6, "Action (High speed)"),
    (7, "Portrait"),
    (8, "Landscape"),
    (9, "Bulb"),
];

const SENSITIVITY_TYPE: &[(i64, &str)] = &[
    (0, "Unknown"),
    (1, "Standard Output Sensitivity"),
    (2, "Recommended Exposure Index"),
    (3, "ISO Speed"),
    (4, "Standard Output Sensitivity and Recommended Exposure Index"),
    (5, "Standard Output Sensitivity and ISO Speed"),
    (6, "Recommended Exposure Index and ISO Speed"),
    (
        7,
        "Standard Output Sensitivity, Recommended Exposure Index and ISO Speed",
    ),
];

const METERING_MODE: &[(i64, &str)] = &[
    (0, "Unknown"),
    (1, "Average"),
    (2, "Center-weighted average"),
    (3, "Spot"),
    (4, "Multi-spot"),
    (5, "Multi-segment"),
    (6, "Partial"),
    (255, "Other"),
];

const LIGHT_SOURCE: &[(i64, &str)] = &[
    (0, "Unknown"),
    (1, "Daylight"),
    (2, "Fluorescent"),
    (3, "Tungsten (Incandescent)"),
    (4, "Flash"),
    (9, "Fine weather"),
    (10, "Cloudy"),
    (11, "Shade"),
    (12, "Daylight Fluorescent"),
    (13, "Day White Fluorescent"),
    (14, "Cool White Fluorescent"),
    (15, "White Fluorescent"),
    (16, "Warm White Fluorescent"),
    (17, "Standard light A"),
    (18, "Standard light B"),
    (19, "Standard light C"),
    (20, "D55"),
    (21, "D65"),
    (22, "D75"),
    (23, "D50"),
    (24, "ISO Studio Tungsten"),
    (255, "Other"),
];

const FLASH: &[(i64, &str)] = &[
    (0x00, "No Flash"),
    (0x01, "Fired"),
    (0x05, "Fired, Return not detected"),
    (0x07, "Fired, Return detected"),
    (0x08, "On, Did not fire"),
    (0x09, "On, Fired"),
    (0x0D, "On, Return not detected"),
    (0x0F, "On, Return detected"),
    (0x10, "Off, Did not fire"),
    (0x14, "Off, Did not fire, Return not detected"),
    (0x18, "Auto, Did not fire"),
    (0x19, "Auto, Fired"),
    (0x1D, "Auto, Fired, Return not detected"),
    (0x1F, "Auto, Fired, Return detected"),
    (0x20, "No flash function"),
    (0x30, "Off, No flash function"),
    (0x41, "Fired, Red-eye reduction"),
    (0x45, "Fired, Red-eye reduction, Return not detected"),
    (0x47, "Fired, Red-eye reduction, Return detected"),
    (0x49, "On, Red-eye reduction"),
    (0x4D, "On, Red-eye reduction, Return not detected"),
    (0x4F, "On, Red-eye reduction, Return detected"),
    (0x50, "Off, Red-eye reduction"),
    (0x58, "Auto, Did not fire, Red-eye reduction"),
    (0x59, "Auto, Fired, Red-eye reduction"),
    (0x5D, "Auto, Fired, Red-eye reduction, Return not detected"),
    (0x5F, "Auto, Fired, Red-eye reduction, Return detected"),
];

const SECURITY_CLASSIFICATION: &[(&str, &str)] = &[
    ("C", "Confidential"),
    ("R", "Restricted"),
    ("S", "Secret"),
    ("T", "Top Secret"),
    ("U", "Unclassified"),
];

const SENSING_METHOD: &[(i64, &str)] = &[
    (1, "Monochrome area"),
    (2, "One-chip color area"),
    (3, "Two-chip color area"),
    (4, "Three-chip color area"),
    (5, "Color sequential area"),
    (6, "Monochrome linear"),
    (7, "Trilinear"),
    (8, "Color sequential linear"),
];

const EXIF_SENSING_METHOD: &[(i64, &str)] = &[
    (1, "Not defined"),
    (2, "One-chip color area"),
    (3, "Two-chip color area"),
    (4, "Three-chip color area"),
    (5, "Color sequential area"),
    (7, "Trilinear"),
    (8, "Color sequential linear"),
];

const COLOR_SPACE: &[(i64, &str)] = &[
    (0x1, "sRGB"),
    (0x2, "Adobe RGB"),
    (0xFFFD, "Wide Gamut RGB"),
    (0xFFFE, "ICC Profile"),
    (0xFFFF, "Uncalibrated"),
];

const FILE_SOURCE: &[(i64, &str)] = &[
    (1, "Film Scanner"),
    (2, "Reflection Print Scanner"),
    (3, "Digital Camera"),
];

const SCENE_TYPE: &[(i64, &str)] = &[(1, "Directly photographed")];

const CUSTOM_RENDERED: &[(i64, &str)] = &[(0, "Normal"), (1, "Custom")];

const EXPOSURE_MODE: &[(i64, &str)] = &[(0, "Auto"), (1, "Manual"), (2, "Auto bracket")];

const WHITE_BALANCE: &[(i64, &str)] = &[(0, "Auto"), (1, "Manual")];

const SCENE_CAPTURE_TYPE: &[(i64, &str)] =
    &[(0, "Standard"), (1, "Landscape"), (2, "Portrait"), (3, "Night")];

const GAIN_CONTROL: &[(i64, &str)] = &[
    (0, "None"),
    (1, "Low gain up"),
    (2, "High gain up"),
    (3, "Low gain down"),
    (4, "High gain down"),
];

const LEVEL: &[(i64, &str)] = &[(0, "Normal"), (1, "Low"), (2, "High")];

const SHARPNESS: &[(i64, &str)] = &[(0, "Normal"), (1, "Soft"), (2, "Hard")];

const SUBJECT_DISTANCE_RANGE: &[(i64, &str)] =
    &[(0, "Unknown"), (1, "Macro"), (2, "Close"), (3, "Distant")];

const LATITUDE_REF: &[(&str, &str)] = &[("N", "North"), ("S", "South")];

const LONGITUDE_REF: &[(&str, &str)] = &[("E", "East"), ("W", "West")];

const ALTITUDE_REF: &[(i64, &str)] = &[(0, "Sea level"), (1, "Sea level reference")];

const GPS_STATUS: &[(&str, &str)] = &[
    ("A", "Measurement in progress"),
    ("V", "Measurement Interoperability"),
];

const GPS_MEASURE_MODE: &[(&str, &str)] = &[("2", "2-dimensional"), ("3", "3-dimensional")];

const GPS_SPEED_REF: &[(&str, &str)] = &[
    ("K", "Kilometers Per Hour"),
    ("M", "Miles Per Hour"),
    ("N", "Knots"),
];

const GPS_DIRECTION_REF: &[(&str, &str)] = &[("T", "True direction"), ("M", "Magnetic direction")];

const GPS_DIFFERENTIAL: &[(i64, &str)] = &[
    (0, "Measurement without differential correction"),
    (1, "Differential correction applied"),
];

// =============================================================================
// Rule tables
// =============================================================================

/// Renderers for base and Exif directory tags.
pub const TIFF_RULES: &[(u16, Rule)] = &[
    (0x0102, Rule::Format(f::bits_per_sample)),
    (0x0103, lookup(COMPRESSION)),
    (0x0106, lookup(PHOTOMETRIC_INTERPRETATION)),
    (0x0107, lookup(THRESHOLDING)),
    (0x010A, lookup(FILL_ORDER)),
    (0x0112, lookup(ORIENTATION)),
    (0x011A, Rule::Format(f::resolution)),
    (0x011B, Rule::Format(f::resolution)),
    (0x011C, lookup(PLANAR_CONFIGURATION)),
    (0x0122, lookup(GRAY_RESPONSE_UNIT)),
    (0x0128, lookup(RESOLUTION_UNIT)),
    (0x013D, lookup(PREDICTOR)),
    (0x014C, lookup(INK_SET)),
    (0x0212, Rule::Format(f::ycbcr_subsampling)),
    (0x0213, lookup(YCBCR_POSITIONING)),
    (0x0214, Rule::Format(f::reference_black_white)),
    (0x8298, Rule::Format(f::copyright)),
    (0x829A, Rule::Format(f::exposure_time)),
    (0x829D, Rule::Format(f::one_decimal)),
    (0x8822, lookup(EXPOSURE_PROGRAM)),
    (
        0x8830,
        Rule::Lookup {
            labels: SENSITIVITY_TYPE,
            default: Some("reserved"),
        },
    ),
    (0x9101, Rule::Format(f::components_configuration)),
    (0x9102, Rule::Format(f::quotient)),
    (0x9201, Rule::Format(f::shutter_speed)),
    (0x9202, Rule::Format(f::aperture)),
    (0x9203, Rule::Format(f::exposure_value)),
    (0x9204, Rule::Format(f::exposure_value)),
    (0x9205, Rule::Format(f::aperture)),
    (0x9206, Rule::Format(f::subject_distance)),
    (0x9207, lookup(METERING_MODE)),
    (0x9208, lookup(LIGHT_SOURCE)),
    (
        0x9209,
        Rule::Lookup {
            labels: FLASH,
            default: None,
        },
    ),
    (0x920A, Rule::Format(f::focal_length)),
    (
        0x9210,
        Rule::Lookup {
            labels: FOCAL_PLANE_RESOLUTION_UNIT,
            default: Some("unknow"),
        },
    ),
    (0x9212, letters(SECURITY_CLASSIFICATION)),
    (
        0x9217,
        Rule::Lookup {
            labels: SENSING_METHOD,
            default: Some("unknow"),
        },
    ),
    (0xA001, lookup(COLOR_SPACE)),
    (0xA20B, Rule::Format(f::one_decimal)),
    (0xA20E, Rule::Format(f::quotient)),
    (0xA20F, Rule::Format(f::quotient)),
    (0xA210, lookup(FOCAL_PLANE_RESOLUTION_UNIT)),
    (0xA217, lookup(EXIF_SENSING_METHOD)),
    (0xA300, lookup(FILE_SOURCE)),
    (0xA301, lookup(SCENE_TYPE)),
    (0xA401, lookup(CUSTOM_RENDERED)),
    (0xA402, lookup(EXPOSURE_MODE)),
    (0xA403, lookup(WHITE_BALANCE)),
    (0xA404, Rule::Format(f::one_decimal)),
    (0xA406, lookup(SCENE_CAPTURE_TYPE)),
    (0xA407, lookup(GAIN_CONTROL)),
    (0xA408, lookup(LEVEL)),
    (0xA409, lookup(LEVEL)),
    (0xA40A, lookup(SHARPNESS)),
    (0xA40C, lookup(SUBJECT_DISTANCE_RANGE)),
    (0xA432, Rule::Format(f::lens_info)),
];

/// Renderers for GPS directory tags.
pub const GPS_RULES: &[(u16, Rule)] = &[
    (
        0x01,
        Rule::Letter {
            labels: LATITUDE_REF,
            default: UNKNOWN,
            ignore_case: false,
        },
    ),
    (0x02, Rule::Format(f::gps_coordinate)),
    (
        0x03,
        Rule::Letter {
            labels: LONGITUDE_REF,
            default: UNKNOWN,
            ignore_case: false,
        },
    ),
    (0x04, Rule::Format(f::gps_coordinate)),
    (0x05, lookup(ALTITUDE_REF)),
    (0x06, Rule::Format(f::gps_altitude)),
    (0x07, Rule::Format(f::gps_timestamp)),
    (0x09, letters(GPS_STATUS)),
    (
        0x0A,
        Rule::Letter {
            labels: GPS_MEASURE_MODE,
            default: UNKNOWN,
            ignore_case: false,
        },
    ),
    (0x0C, letters(GPS_SPEED_REF)),
    (0x0E, letters(GPS_DIRECTION_REF)),
    (0x0F, Rule::Format(f::gps_bearing)),
    (0x10, letters(GPS_DIRECTION_REF)),
    (0x11, Rule::Format(f::gps_bearing)),
    (
        0x13,
        Rule::Letter {
            labels: LATITUDE_REF,
            default: UNKNOWN,
            ignore_case: false,
        },
    ),
    (0x14, Rule::Format(f::gps_coordinate)),
    (
        0x15,
        Rule::Letter {
            labels: LONGITUDE_REF,
            default: UNKNOWN,
            ignore_case: false,
        },
    ),
    (0x16, Rule::Format(f::gps_coordinate)),
    (0x17, letters(GPS_DIRECTION_REF)),
    (0x18, Rule::Format(f::gps_bearing)),
    (0x19, letters(GPS_SPEED_REF)),
    (
        0x1E,
        Rule::Lookup {
            labels: GPS_DIFFERENTIAL,
            default: None,
        },
    ),
];
