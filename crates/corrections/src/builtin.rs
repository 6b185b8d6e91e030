//! Corrections for the 1:50m world atlas topology joined against the
//! REST Countries v2 attribute table.

use foundation::NumericId;
use scene::Marker;

use crate::patch::{
    AttributePatch, AttributeValue, CapitalOffset, GeometryPatch, LabelOverride, TerritoryPatch,
};

/// Offset applied to every capital marker unless overridden.
pub const CAPITAL_MARKER_OFFSET: f64 = -7.0;

pub(crate) fn geometry_patches() -> Vec<GeometryPatch> {
    vec![
        // Indian Ocean Territories: Christmas Island plus the Cocos group.
        GeometryPatch::ReassignId {
            position: 98,
            expect: NumericId::DISPUTED,
            to: NumericId::new(162),
        },
        // Ashmore and Cartier Islands share Australia's code.
        GeometryPatch::Exclude {
            position: 11,
            expect: NumericId::new(36),
        },
        GeometryPatch::ReassignId {
            position: 118,
            expect: NumericId::DISPUTED,
            to: NumericId::new(999),
        },
    ]
}

const ALT_SPELLING_SEEDS: &[(&str, &str)] = &[
    ("COG", "Republic of the Congo"),
    ("COD", "Democratic Republic of the Congo"),
    ("GBR", "Britain"),
    ("MAF", "St Martin"),
    ("SXM", "Sint Maarten"),
    ("VGB", "British Virgin Islands"),
    ("VIR", "US Virgin Islands"),
];

const PRESERVED_NAMES: &[&str] = &[
    "VEN", "BOL", "GBR", "MDA", "MKD", "PSE", "SYR", "IRN", "PRK", "KOR", "LAO", "BRN", "COD",
    "TZA", "FSM", "BLM", "KNA", "LCA", "MAF", "SHN", "SPM", "VCT", "KOS", "VAT",
];

const NAME_OVERRIDES: &[(&str, &str)] = &[
    ("VEN", "Venezuela"),
    ("BOL", "Bolivia"),
    ("GBR", "United Kingdom"),
    ("MDA", "Moldova"),
    ("MKD", "Macedonia"),
    ("KOS", "Kosovo"),
    ("PSE", "Palestine"),
    ("SYR", "Syria"),
    ("IRN", "Iran"),
    ("PRK", "North Korea"),
    ("KOR", "South Korea"),
    ("LAO", "Laos"),
    ("BRN", "Brunei"),
    ("COD", "DR Congo"),
    ("TZA", "Tanzania"),
    ("FSM", "Micronesia"),
    ("BLM", "St Barthélemy"),
    ("KNA", "St Kitts and Nevis"),
    ("LCA", "St Lucia"),
    ("MAF", "St Martin (French part)"),
    ("SHN", "St Helena, Ascension and Tristan da Cunha"),
    ("SPM", "St Pierre and Miquelon"),
    ("VCT", "St Vincent and the Grenadines"),
];

// Square kilometres, for records published with a null area.
const AREA_OVERRIDES: &[(&str, f64)] = &[
    ("PSE", 6220.0),
    ("SGS", 3903.0),
    ("SHN", 394.0),
    ("REU", 2511.0),
    ("MYT", 374.0),
    ("GUF", 83534.0),
    ("MTQ", 1128.0),
    ("GLP", 1628.0),
    ("SJM", 62049.0),
];

const DEPENDENCIES: &[(&str, &[&str])] = &[
    ("NZL", &["COK", "NIU", "TKL"]),
    (
        "GBR",
        &[
            "AIA", "BMU", "IOT", "VGB", "CYM", "FLK", "MSR", "PCN", "SHN", "TCA", "SGS", "GGY",
            "JEY", "IMN",
        ],
    ),
    ("USA", &["GUM", "MNP", "PRI", "VIR", "ASM"]),
    ("AUS", &["CXR", "CCK", "NFK", "HMD"]),
    ("CHN", &["HKG", "MAC"]),
    ("DNK", &["FRO", "GRL"]),
    (
        "FRA",
        &[
            "BLM", "MAF", "SPM", "WLF", "PYF", "NCL", "REU", "GLP", "MTQ", "GUF", "MYT",
        ],
    ),
    ("NLD", &["ABW", "CUW", "SXM", "BES"]),
    ("FIN", &["ALA"]),
    ("NOR", &["SJM"]),
];

fn set(alpha3: &str, value: AttributeValue) -> AttributePatch {
    AttributePatch::Set {
        alpha3: alpha3.to_string(),
        value,
    }
}

pub(crate) fn attribute_patches() -> Vec<AttributePatch> {
    let mut patches = Vec::new();
    patches.extend(ALT_SPELLING_SEEDS.iter().map(|(alpha3, spelling)| {
        AttributePatch::SeedAltSpelling {
            alpha3: alpha3.to_string(),
            spelling: spelling.to_string(),
        }
    }));
    patches.extend(PRESERVED_NAMES.iter().map(|alpha3| AttributePatch::PreserveName {
        alpha3: alpha3.to_string(),
    }));
    patches.extend(
        NAME_OVERRIDES
            .iter()
            .map(|(alpha3, name)| set(alpha3, AttributeValue::Name(name.to_string()))),
    );
    patches.extend(
        AREA_OVERRIDES
            .iter()
            .map(|(alpha3, area)| set(alpha3, AttributeValue::Area(*area))),
    );
    patches.push(set("KOS", AttributeValue::NumericCode(NumericId::new(999))));
    patches.push(set("KOS", AttributeValue::Alpha2Code("KO".to_string())));
    // Holy See: its published capital collides with Italy's.
    patches.push(set("VAT", AttributeValue::Capital("Vatican City".to_string())));
    patches.push(set("VAT", AttributeValue::Name("Vatican City".to_string())));
    patches.extend(
        DEPENDENCIES
            .iter()
            .map(|(sovereign, dependents)| AttributePatch::RegionOf {
                sovereign: sovereign.to_string(),
                dependents: dependents.iter().map(|d| d.to_string()).collect(),
            }),
    );
    patches
}

const SPLITS: &[(&str, &str, usize, usize)] = &[
    ("FRA", "REU", 0, 1),
    ("FRA", "MYT", 1, 1),
    ("FRA", "GUF", 2, 1),
    ("FRA", "MTQ", 3, 1),
    ("FRA", "GLP", 4, 3),
    ("NLD", "BES", 0, 3),
    ("CXR", "CCK", 0, 2),
    ("NOR", "SJM", 22, 10),
    ("NZL", "TKL", 11, 2),
];

pub(crate) fn territory_patches() -> Vec<TerritoryPatch> {
    SPLITS
        .iter()
        .map(|&(parent, child, start, count)| TerritoryPatch::Split {
            parent: parent.to_string(),
            child: child.to_string(),
            start,
            count,
        })
        .collect()
}

const EXTRA_CAPITALS: &[(&str, &str, [f64; 2])] = &[
    ("Cayenne", "GUF", [-52.3135, 4.9224]),
    ("Saint-Denis", "REU", [55.4551, -20.8907]),
    ("Fort-de-France", "MTQ", [-61.0588, 14.6161]),
    ("Mamoudzou", "MYT", [45.2279, -12.7809]),
    ("Basse-Terre", "GLP", [-61.6947, 16.0341]),
    ("Kralendijk", "BES", [-68.2655, 12.1443]),
    ("Fakaofo", "TKL", [-171.2188, -9.3803]),
];

pub(crate) fn extra_capitals() -> Vec<Marker> {
    EXTRA_CAPITALS
        .iter()
        .map(|&(name, alpha3, coordinates)| Marker {
            name: name.to_string(),
            alpha3_code: alpha3.to_string(),
            coordinates,
            marker_offset: CAPITAL_MARKER_OFFSET,
        })
        .collect()
}

const LABEL_COORDINATES: &[(&str, [f64; 2])] = &[
    // Americas
    ("CAN", [-100.0, 55.0]),
    ("USA", [-100.0, 40.0]),
    ("CHL", [-73.0, -39.0]),
    // Oceania
    ("FJI", [177.5, -18.0]),
    ("KIR", [189.0, -1.0]),
    ("MHL", [169.0, 8.5]),
    ("FSM", [151.0, 7.5]),
    ("MNP", [145.5, 16.5]),
    ("SLB", [161.6, -9.75]),
    ("VUT", [168.5, -17.0]),
    ("NCL", [163.8, -20.9]),
    ("PLW", [133.0, 6.0]),
];

const LABEL_OFFSETS: &[(&str, f64)] = &[
    // South America and Africa
    ("SUR", -10.0),
    ("GUY", -15.0),
    ("DOM", 10.0),
    ("GMB", 3.0),
    ("GNB", 5.0),
    ("GIN", 5.0),
    ("SLE", 5.0),
    ("LBR", 5.0),
    ("NGA", -5.0),
    ("CIV", 22.0),
    ("GHA", 10.0),
    ("TGO", 5.0),
    ("CAF", 5.0),
    ("CMR", 10.0),
    ("COD", -17.0),
    ("COG", 10.0),
    ("KEN", 10.0),
    ("COM", -5.0),
    ("MUS", -5.0),
    ("ZAF", -8.0),
    ("MWI", -5.0),
    // Europe
    ("AUT", -5.0),
    ("CHE", 5.0),
    ("SVN", -3.0),
    ("HRV", -5.0),
    ("BIH", -7.0),
    ("SRB", 3.0),
    ("MNE", -5.0),
    ("ALB", 5.0),
    // Asia
    ("ISR", 10.0),
    ("JOR", 10.0),
    ("LBN", 5.0),
    ("GEO", -5.0),
    ("ARM", -8.0),
    ("TKM", 5.0),
    ("AZE", 3.0),
    ("BRN", -5.0),
    // Oceania
    ("WLF", -10.0),
    ("ASM", 10.0),
];

pub(crate) fn country_labels() -> Vec<LabelOverride> {
    let coordinates = LABEL_COORDINATES
        .iter()
        .map(|&(alpha3, coordinates)| LabelOverride::Coordinates {
            alpha3: alpha3.to_string(),
            coordinates,
        });
    let offsets = LABEL_OFFSETS
        .iter()
        .map(|&(alpha3, offset)| LabelOverride::Offset {
            alpha3: alpha3.to_string(),
            offset,
        });
    coordinates.chain(offsets).collect()
}

const CAPITAL_OFFSETS: &[(&str, f64)] = &[
    // Caribbean and South America
    ("GTM", 10.0),
    ("SLV", 12.0),
    ("CRI", 12.0),
    ("URY", 15.0),
    ("GUY", -10.0),
    ("SUR", -5.0),
    ("GUF", 0.0),
    ("DOM", 0.0),
    // Africa
    ("CPV", -10.0),
    ("SEN", 0.0),
    ("GMB", 2.0),
    ("GNB", 2.0),
    ("GIN", 2.0),
    ("SLE", 6.0),
    ("LBR", 4.0),
    ("BFA", 13.0),
    ("CIV", -10.0),
    ("GHA", 12.0),
    ("TGO", 5.0),
    ("BEN", -3.0),
    ("NGA", 0.0),
    ("STP", -5.0),
    ("GNQ", 0.0),
    ("GAB", 10.0),
    ("COG", -5.0),
    ("COD", 12.0),
    ("CAF", -10.0),
    ("ERI", 0.0),
    ("BDI", 12.0),
    ("MYT", 13.0),
    ("REU", 13.0),
    ("ZAF", -3.0),
    ("LSO", 13.0),
    ("SWZ", 13.0),
    // Europe
    ("EST", 13.0),
    ("SVK", 13.0),
    ("HUN", 13.0),
    ("HRV", 8.0),
    ("SVN", 0.0),
    ("CHE", 0.0),
    ("AND", 0.0),
    ("MCO", 0.0),
    ("VAT", 15.0),
    ("BIH", 0.0),
    ("ALB", 12.0),
    ("MKD", 12.0),
    ("MNE", 0.0),
    ("BGR", 5.0),
    // Asia
    ("ARM", 13.0),
    ("PSE", 13.0),
    ("JOR", 3.0),
    ("IRQ", -3.0),
    ("KWT", -3.0),
    ("SYR", -12.0),
    ("OMN", 12.0),
    ("ARE", -3.0),
    ("AFG", -9.0),
    ("PAK", -5.0),
    ("IND", -9.0),
    ("NPL", -5.0),
    ("BTN", 13.0),
    ("BGD", 13.0),
    ("KOR", 13.0),
    // Oceania
    ("GUM", 13.0),
    ("KIR", 13.0),
    ("ASM", 13.0),
    ("WLF", -10.0),
    ("WSM", -3.0),
];

pub(crate) fn capital_offsets() -> Vec<CapitalOffset> {
    CAPITAL_OFFSETS
        .iter()
        .map(|&(alpha3, offset)| CapitalOffset {
            alpha3: alpha3.to_string(),
            offset,
        })
        .collect()
}

/// Every alpha-3 code the built-in table addresses, sorted and deduplicated.
pub fn referenced_alpha3_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = Vec::new();
    codes.extend(ALT_SPELLING_SEEDS.iter().map(|(a, _)| *a));
    codes.extend(PRESERVED_NAMES.iter().copied());
    codes.extend(NAME_OVERRIDES.iter().map(|(a, _)| *a));
    codes.extend(AREA_OVERRIDES.iter().map(|(a, _)| *a));
    codes.extend(["KOS", "VAT"]);
    for &(sovereign, dependents) in DEPENDENCIES {
        codes.push(sovereign);
        codes.extend(dependents.iter().copied());
    }
    for &(parent, child, _, _) in SPLITS {
        codes.push(parent);
        codes.push(child);
    }
    codes.extend(EXTRA_CAPITALS.iter().map(|(_, a, _)| *a));
    codes.extend(LABEL_COORDINATES.iter().map(|(a, _)| *a));
    codes.extend(LABEL_OFFSETS.iter().map(|(a, _)| *a));
    codes.extend(CAPITAL_OFFSETS.iter().map(|(a, _)| *a));
    codes.sort_unstable();
    codes.dedup();
    codes
}
