//! Synthetic world that exercises every code in the built-in correction
//! table, laid out the way the 1:50m atlas is: Ashmore Reef at position 11,
//! the Indian Ocean territories at 98 and Kosovo at 118.

use std::collections::BTreeMap;

use corrections::referenced_alpha3_codes;
use formats::{
    CapitalIndex, CapitalRecord, CountryRecord, RegionFilters, StaticAssets, TopologyFeature,
};
use foundation::NumericId;
use scene::{AreaGeometry, GeoPoint};

const ANTARCTICA_RAW_INDEX: usize = 3;
pub(crate) const ASHMORE_POSITION: usize = 11;
pub(crate) const CYPRUS_POSITION: usize = 50;
pub(crate) const CHRISTMAS_POSITION: usize = 98;
pub(crate) const KOSOVO_POSITION: usize = 118;

/// Records that only exist as decomposition children.
pub(crate) const CHILDREN: &[&str] = &[
    "REU", "MYT", "GUF", "MTQ", "GLP", "BES", "CCK", "SJM", "TKL",
];

const KNOWN: &[(&str, &str, Option<i32>, &str)] = &[
    ("AUS", "AU", Some(36), "Australia"),
    ("FRA", "FR", Some(250), "France"),
    ("NLD", "NL", Some(528), "Netherlands"),
    ("NOR", "NO", Some(578), "Norway"),
    ("NZL", "NZ", Some(554), "New Zealand"),
    ("CXR", "CX", Some(162), "Christmas Island"),
    ("CCK", "CC", Some(166), "Cocos (Keeling) Islands"),
    ("REU", "RE", Some(638), "Réunion"),
    ("MYT", "YT", Some(175), "Mayotte"),
    ("GUF", "GF", Some(254), "French Guiana"),
    ("MTQ", "MQ", Some(474), "Martinique"),
    ("GLP", "GP", Some(312), "Guadeloupe"),
    ("BES", "BQ", Some(535), "Bonaire, Sint Eustatius and Saba"),
    ("SJM", "SJ", Some(744), "Svalbard and Jan Mayen"),
    ("TKL", "TK", Some(772), "Tokelau"),
    ("KOS", "XK", None, "Republic of Kosovo"),
    ("COD", "CD", Some(180), "Congo (Democratic Republic of the)"),
    ("COG", "CG", Some(178), "Congo"),
    (
        "GBR",
        "GB",
        Some(826),
        "United Kingdom of Great Britain and Northern Ireland",
    ),
    ("VAT", "VA", Some(336), "Holy See"),
];

pub(crate) struct Fixture {
    pub topology: Vec<TopologyFeature>,
    pub attributes: Vec<CountryRecord>,
    pub assets: StaticAssets,
}

fn group_count(alpha3: &str) -> usize {
    match alpha3 {
        "FRA" => 12,
        "NOR" => 33,
        "NZL" => 14,
        "NLD" => 4,
        "CXR" => 3,
        _ => 1,
    }
}

/// `n` small squares; group `g` starts at `lon + g * 0.3`.
fn groups(n: usize, lon: f64, lat: f64) -> AreaGeometry {
    AreaGeometry::MultiPolygon(
        (0..n)
            .map(|g| {
                let x = lon + g as f64 * 0.3;
                vec![vec![
                    GeoPoint::new(x, lat),
                    GeoPoint::new(x + 0.2, lat),
                    GeoPoint::new(x + 0.2, lat + 0.2),
                    GeoPoint::new(x, lat + 0.2),
                    GeoPoint::new(x, lat),
                ]]
            })
            .collect(),
    )
}

fn feature(id: NumericId, slot: usize, alpha3: &str) -> TopologyFeature {
    let lon = -170.0 + (slot % 30) as f64 * 11.0;
    let lat = -50.0 + (slot / 30) as f64 * 20.0;
    TopologyFeature {
        id,
        geometry: groups(group_count(alpha3), lon, lat),
    }
}

pub(crate) fn world() -> Fixture {
    let known: BTreeMap<&str, (&str, Option<i32>, &str)> = KNOWN
        .iter()
        .map(|&(alpha3, alpha2, numeric, name)| (alpha3, (alpha2, numeric, name)))
        .collect();

    let mut attributes = Vec::new();
    let mut capitals = Vec::new();
    for (i, alpha3) in referenced_alpha3_codes().into_iter().enumerate() {
        let generic_alpha2 = format!(
            "{}{}",
            (b'a' + (i / 26) as u8) as char,
            (b'a' + (i % 26) as u8) as char
        );
        let generic_name = format!("{alpha3} Name");
        let (alpha2, numeric, name) = match known.get(alpha3) {
            Some(&(alpha2, numeric, name)) => (alpha2.to_string(), numeric, name.to_string()),
            None => (generic_alpha2, Some(1000 + i as i32), generic_name),
        };
        let mut record = CountryRecord::new(name, alpha3, alpha2.clone(), numeric.map(NumericId::new));
        record.capital = Some(format!("{alpha3} City"));
        record.area = Some(1000.0 + i as f64);
        attributes.push(record);

        let capital_alpha2 = if alpha3 == "KOS" { "KO".to_string() } else { alpha2 };
        capitals.push(CapitalRecord {
            country_name: None,
            capital_name: Some(format!("{alpha3} City")),
            country_code: capital_alpha2,
            capital_longitude: i as f64 * 0.5 - 60.0,
            capital_latitude: 10.0,
        });
    }

    let mut with_features = attributes
        .iter()
        .filter(|r| !CHILDREN.contains(&r.alpha3_code.as_str()))
        .filter(|r| r.alpha3_code != "CXR" && r.alpha3_code != "KOS");

    let mut topology = Vec::new();
    let mut position = 0;
    loop {
        let next = match position {
            ASHMORE_POSITION => Some(feature(NumericId::new(36), position, "ASH")),
            CYPRUS_POSITION => Some(feature(NumericId::DISPUTED, position, "CYN")),
            CHRISTMAS_POSITION => Some(feature(NumericId::DISPUTED, position, "CXR")),
            KOSOVO_POSITION => Some(feature(NumericId::DISPUTED, position, "KOS")),
            _ => with_features.next().map(|r| {
                let id = r.numeric_code.unwrap_or(NumericId::DISPUTED);
                feature(id, position, &r.alpha3_code)
            }),
        };
        let Some(next) = next else {
            break;
        };
        topology.push(next);
        position += 1;
    }
    topology.insert(
        ANTARCTICA_RAW_INDEX,
        TopologyFeature {
            id: NumericId::ANTARCTICA,
            geometry: groups(2, 0.0, -80.0),
        },
    );

    let all_codes: Vec<String> = attributes.iter().map(|r| r.alpha3_code.clone()).collect();
    let mut views = BTreeMap::new();
    views.insert("world".to_string(), all_codes);
    views.insert(
        "europe".to_string(),
        vec!["FRA".to_string(), "NLD".to_string(), "NOR".to_string()],
    );

    Fixture {
        topology,
        attributes,
        assets: StaticAssets {
            capitals: CapitalIndex::from_records(capitals),
            regions: RegionFilters::new(views),
        },
    }
}
