use chrono_tz::Tz;
use std::collections::HashMap;

/// Builtin IATA-code → IANA-timezone table covering the airports that show
/// up in itineraries most often. Consumers pass this (or a fixture) into
/// the date resolver; nothing reads it as hidden module state. Using full
/// zones rather than fixed offsets keeps the fallback DST-correct.
pub fn builtin_airport_zones() -> HashMap<String, Tz> {
    use chrono_tz::{Africa, America, Asia, Australia, Europe, Pacific};

    HashMap::from([
        // North America
        ("ATL".to_string(), America::New_York),
        ("BOS".to_string(), America::New_York),
        ("JFK".to_string(), America::New_York),
        ("EWR".to_string(), America::New_York),
        ("MIA".to_string(), America::New_York),
        ("ORD".to_string(), America::Chicago),
        ("DFW".to_string(), America::Chicago),
        ("IAH".to_string(), America::Chicago),
        ("MSP".to_string(), America::Chicago),
        ("DEN".to_string(), America::Denver),
        ("PHX".to_string(), America::Phoenix),
        ("LAX".to_string(), America::Los_Angeles),
        ("SFO".to_string(), America::Los_Angeles),
        ("SEA".to_string(), America::Los_Angeles),
        ("SAN".to_string(), America::Los_Angeles),
        ("LAS".to_string(), America::Los_Angeles),
        ("YYZ".to_string(), America::Toronto),
        ("YVR".to_string(), America::Vancouver),
        ("MEX".to_string(), America::Mexico_City),
        // South America
        ("GRU".to_string(), America::Sao_Paulo),
        ("EZE".to_string(), Tz::America__Argentina__Buenos_Aires),
        ("BOG".to_string(), America::Bogota),
        ("SCL".to_string(), America::Santiago),
        // Europe
        ("LHR".to_string(), Europe::London),
        ("LGW".to_string(), Europe::London),
        ("CDG".to_string(), Europe::Paris),
        ("ORY".to_string(), Europe::Paris),
        ("AMS".to_string(), Europe::Amsterdam),
        ("FRA".to_string(), Europe::Berlin),
        ("MUC".to_string(), Europe::Berlin),
        ("MAD".to_string(), Europe::Madrid),
        ("BCN".to_string(), Europe::Madrid),
        ("FCO".to_string(), Europe::Rome),
        ("ZRH".to_string(), Europe::Zurich),
        ("VIE".to_string(), Europe::Vienna),
        ("CPH".to_string(), Europe::Copenhagen),
        ("ARN".to_string(), Europe::Stockholm),
        ("OSL".to_string(), Europe::Oslo),
        ("HEL".to_string(), Europe::Helsinki),
        ("LIS".to_string(), Europe::Lisbon),
        ("DUB".to_string(), Europe::Dublin),
        ("IST".to_string(), Europe::Istanbul),
        ("ATH".to_string(), Europe::Athens),
        ("WAW".to_string(), Europe::Warsaw),
        ("PRG".to_string(), Europe::Prague),
        // Middle East / Africa
        ("DXB".to_string(), Asia::Dubai),
        ("AUH".to_string(), Asia::Dubai),
        ("DOH".to_string(), Asia::Qatar),
        ("TLV".to_string(), Asia::Jerusalem),
        ("CAI".to_string(), Africa::Cairo),
        ("JNB".to_string(), Africa::Johannesburg),
        ("CPT".to_string(), Africa::Johannesburg),
        ("NBO".to_string(), Africa::Nairobi),
        ("CMN".to_string(), Africa::Casablanca),
        // Asia
        ("NRT".to_string(), Asia::Tokyo),
        ("HND".to_string(), Asia::Tokyo),
        ("KIX".to_string(), Asia::Tokyo),
        ("ICN".to_string(), Asia::Seoul),
        ("PEK".to_string(), Asia::Shanghai),
        ("PVG".to_string(), Asia::Shanghai),
        ("CAN".to_string(), Asia::Shanghai),
        ("HKG".to_string(), Asia::Hong_Kong),
        ("TPE".to_string(), Asia::Taipei),
        ("SIN".to_string(), Asia::Singapore),
        ("KUL".to_string(), Asia::Kuala_Lumpur),
        ("BKK".to_string(), Asia::Bangkok),
        ("CGK".to_string(), Asia::Jakarta),
        ("MNL".to_string(), Asia::Manila),
        ("DEL".to_string(), Asia::Kolkata),
        ("BOM".to_string(), Asia::Kolkata),
        ("BLR".to_string(), Asia::Kolkata),
        // Oceania
        ("SYD".to_string(), Australia::Sydney),
        ("MEL".to_string(), Australia::Melbourne),
        ("BNE".to_string(), Australia::Brisbane),
        ("PER".to_string(), Australia::Perth),
        ("AKL".to_string(), Pacific::Auckland),
        ("HNL".to_string(), Pacific::Honolulu),
    ])
}
