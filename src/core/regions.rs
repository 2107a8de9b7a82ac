//! Static lookup from place names to province and administrative region.

/// Province and region a place belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionEntry {
    pub province: &'static str,
    pub region: &'static str,
}

/// (place, province, region); places are lowercase
const PLACES: &[(&str, &str, &str)] = &[
    // National Capital Region
    ("metro manila", "metro manila", "ncr"),
    ("manila", "metro manila", "ncr"),
    ("quezon city", "metro manila", "ncr"),
    ("makati", "metro manila", "ncr"),
    ("taguig", "metro manila", "ncr"),
    ("pasig", "metro manila", "ncr"),
    ("mandaluyong", "metro manila", "ncr"),
    ("paranaque", "metro manila", "ncr"),
    ("las pinas", "metro manila", "ncr"),
    ("muntinlupa", "metro manila", "ncr"),
    ("caloocan", "metro manila", "ncr"),
    ("marikina", "metro manila", "ncr"),
    ("pasay", "metro manila", "ncr"),
    ("san juan", "metro manila", "ncr"),
    ("valenzuela", "metro manila", "ncr"),
    // Central Luzon
    ("bulacan", "bulacan", "region iii"),
    ("malolos", "bulacan", "region iii"),
    ("pampanga", "pampanga", "region iii"),
    ("angeles", "pampanga", "region iii"),
    ("san fernando", "pampanga", "region iii"),
    ("tarlac", "tarlac", "region iii"),
    ("bataan", "bataan", "region iii"),
    ("zambales", "zambales", "region iii"),
    ("olongapo", "zambales", "region iii"),
    ("nueva ecija", "nueva ecija", "region iii"),
    ("cabanatuan", "nueva ecija", "region iii"),
    // CALABARZON
    ("cavite", "cavite", "region iv-a"),
    ("bacoor", "cavite", "region iv-a"),
    ("dasmarinas", "cavite", "region iv-a"),
    ("imus", "cavite", "region iv-a"),
    ("laguna", "laguna", "region iv-a"),
    ("santa rosa", "laguna", "region iv-a"),
    ("calamba", "laguna", "region iv-a"),
    ("batangas", "batangas", "region iv-a"),
    ("lipa", "batangas", "region iv-a"),
    ("rizal", "rizal", "region iv-a"),
    ("antipolo", "rizal", "region iv-a"),
    ("cainta", "rizal", "region iv-a"),
    ("quezon province", "quezon", "region iv-a"),
    ("lucena", "quezon", "region iv-a"),
    // Ilocos, Cordillera
    ("pangasinan", "pangasinan", "region i"),
    ("dagupan", "pangasinan", "region i"),
    ("ilocos norte", "ilocos norte", "region i"),
    ("laoag", "ilocos norte", "region i"),
    ("la union", "la union", "region i"),
    ("benguet", "benguet", "car"),
    ("baguio", "benguet", "car"),
    // Bicol
    ("albay", "albay", "region v"),
    ("legazpi", "albay", "region v"),
    ("camarines sur", "camarines sur", "region v"),
    ("naga", "camarines sur", "region v"),
    // Western Visayas
    ("iloilo", "iloilo", "region vi"),
    ("negros occidental", "negros occidental", "region vi"),
    ("bacolod", "negros occidental", "region vi"),
    ("aklan", "aklan", "region vi"),
    ("capiz", "capiz", "region vi"),
    ("roxas", "capiz", "region vi"),
    // Central Visayas
    ("cebu", "cebu", "region vii"),
    ("mandaue", "cebu", "region vii"),
    ("lapu-lapu", "cebu", "region vii"),
    ("talisay", "cebu", "region vii"),
    ("bohol", "bohol", "region vii"),
    ("tagbilaran", "bohol", "region vii"),
    ("negros oriental", "negros oriental", "region vii"),
    ("dumaguete", "negros oriental", "region vii"),
    // Eastern Visayas
    ("leyte", "leyte", "region viii"),
    ("tacloban", "leyte", "region viii"),
    ("samar", "samar", "region viii"),
    // Mindanao
    ("davao", "davao del sur", "region xi"),
    ("davao del sur", "davao del sur", "region xi"),
    ("davao del norte", "davao del norte", "region xi"),
    ("tagum", "davao del norte", "region xi"),
    ("misamis oriental", "misamis oriental", "region x"),
    ("cagayan de oro", "misamis oriental", "region x"),
    ("bukidnon", "bukidnon", "region x"),
    ("zamboanga", "zamboanga del sur", "region ix"),
    ("zamboanga del sur", "zamboanga del sur", "region ix"),
    ("south cotabato", "south cotabato", "region xii"),
    ("general santos", "south cotabato", "region xii"),
    ("agusan del norte", "agusan del norte", "caraga"),
    ("butuan", "agusan del norte", "caraga"),
];

/// Resolve a free-text location to its province and region
///
/// The longest known place name contained in the text wins, so
/// "Davao del Norte" resolves before "Davao".
pub fn lookup(location: &str) -> Option<RegionEntry> {
    let normalized = normalize_place(location);
    if normalized.is_empty() {
        return None;
    }

    PLACES
        .iter()
        .filter(|(place, _, _)| contains_phrase(&normalized, place))
        .max_by_key(|(place, _, _)| place.len())
        .map(|&(_, province, region)| RegionEntry { province, region })
}

/// Lowercase, fold common Spanish letters and drop punctuation except hyphens
fn normalize_place(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'ñ' => 'n',
            'á' | 'à' => 'a',
            'é' | 'è' => 'e',
            'í' | 'ì' => 'i',
            'ó' | 'ò' => 'o',
            'ú' | 'ù' => 'u',
            c if c.is_alphanumeric() || c == '-' => c,
            _ => ' ',
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word phrase containment
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack == phrase
        || haystack.starts_with(&format!("{} ", phrase))
        || haystack.ends_with(&format!(" {}", phrase))
        || haystack.contains(&format!(" {} ", phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_cities_to_provinces() {
        let entry = lookup("Cebu City").unwrap();
        assert_eq!(entry.province, "cebu");
        assert_eq!(entry.region, "region vii");

        let entry = lookup("Mandaue, Cebu").unwrap();
        assert_eq!(entry.province, "cebu");
    }

    #[test]
    fn longest_place_wins() {
        assert_eq!(lookup("Tagum, Davao del Norte").unwrap().province, "davao del norte");
        assert_eq!(lookup("Davao City").unwrap().province, "davao del sur");
    }

    #[test]
    fn folds_accents_and_punctuation() {
        assert_eq!(lookup("Parañaque").unwrap().region, "ncr");
        assert_eq!(lookup("Dasmariñas, Cavite").unwrap().province, "cavite");
    }

    #[test]
    fn unknown_places_do_not_resolve() {
        assert!(lookup("Springfield").is_none());
        assert!(lookup("").is_none());
        // Partial words are not matched
        assert!(lookup("Cebuano Street").is_none());
    }
}
