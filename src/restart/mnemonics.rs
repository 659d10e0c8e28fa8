//! Mnemonic validity tables and positional slot layouts for the
//! report-control keywords.
//!
//! The positional (integer-list) style predates mnemonics: each slot of the
//! integer list maps to one fixed mnemonic. The layouts below reproduce the
//! ECLIPSE 100 manual tables; blank entries are reserved slots that are
//! accepted and ignored.

/// RPTRST positional slot layout. Slot 27 (index 26) is special-cased by the
/// resolver: it drives both PCOW and PCOG.
pub(crate) const RST_INTEGER_KEYWORDS: [&str; 31] = [
    "BASIC",    //  1
    "FLOWS",    //  2
    "FIP",      //  3
    "POT",      //  4
    "PBPD",     //  5
    "FREQ",     //  6
    "PRES",     //  7
    "VISC",     //  8
    "DEN",      //  9
    "DRAIN",    // 10
    "KRO",      // 11
    "KRW",      // 12
    "KRG",      // 13
    "PORO",     // 14
    "NOGRAD",   // 15
    "NORST",    // 16
    "SAVE",     // 17
    "SFREQ",    // 18
    "ALLPROPS", // 19
    "ROCKC",    // 20
    "SGTRAP",   // 21
    "",         // 22 - reserved
    "RSSAT",    // 23
    "RVSAT",    // 24
    "GIMULT",   // 25
    "SURFBLK",  // 26
    "",         // 27 - PCOW and PCOG, special cased
    "STREAM",   // 28
    "RK",       // 29
    "VELOCITY", // 30
    "COMPRESS", // 31
];

/// RPTSCHED positional slot layout. Slot 7 is the RESTART switch.
pub(crate) const SCHED_INTEGER_KEYWORDS: [&str; 79] = [
    "PRES",    //  1
    "SOIL",    //  2
    "SWAT",    //  3
    "SGAS",    //  4
    "RS",      //  5
    "RV",      //  6
    "RESTART", //  7
    "FIP",     //  8
    "WELLS",   //  9
    "VFPPROD", // 10
    "SUMMARY", // 11
    "CPU",     // 12
    "AQUCT",   // 13
    "WELSPECS",// 14
    "NEWTON",  // 15
    "POILD",   // 16
    "PWAT",    // 17
    "PWATD",   // 18
    "PGAS",    // 19
    "PGASD",   // 20
    "FIPVE",   // 21
    "WOC",     // 22
    "GOC",     // 23
    "WOCDIFF", // 24
    "GOCDIFF", // 25
    "WOCGOC",  // 26
    "ODGAS",   // 27
    "ODWAT",   // 28
    "GDOWAT",  // 29
    "WDOGAS",  // 30
    "OILAPI",  // 31
    "FIPITR",  // 32
    "TBLK",    // 33
    "PBLK",    // 34
    "SALT",    // 35
    "PLYADS",  // 36
    "RK",      // 37
    "FIPSALT", // 38
    "TUNING",  // 39
    "GI",      // 40
    "ROCKC",   // 41
    "SPENWAT", // 42
    "FIPSOL",  // 43
    "SURFBLK", // 44
    "SURFADS", // 45
    "FIPSURF", // 46
    "TRADS",   // 47
    "VOIL",    // 48
    "VWAT",    // 49
    "VGAS",    // 50
    "DENO",    // 51
    "DENW",    // 52
    "DENG",    // 53
    "GASCONC", // 54
    "PB",      // 55
    "PD",      // 56
    "KRW",     // 57
    "KRO",     // 58
    "KRG",     // 59
    "MULT",    // 60
    "UNKNOWN", // 61 - not listed in the manual
    "UNKNOWN", // 62
    "FOAM",    // 63
    "FIPFOAM", // 64
    "TEMP",    // 65
    "FIPTEMP", // 66
    "POTC",    // 67
    "FOAMADS", // 68
    "FOAMDCY", // 69
    "FOAMMOB", // 70
    "RECOV",   // 71
    "FLOOIL",  // 72
    "FLOWAT",  // 73
    "FLOGAS",  // 74
    "SGTRAP",  // 75
    "FIPRESV", // 76
    "FLOSOL",  // 77
    "KRN",     // 78
    "GRAD",    // 79
];

/// Mnemonics RPTRST recognizes. Sorted, so membership is a binary search.
const RPTRST_MNEMONICS: [&str; 56] = [
    "ACIP", "ACIS", "ALLPROPS", "BASIC", "BG", "BO",
    "BW", "CELLINDX", "COMPRESS", "CONV", "DEN", "DRAIN",
    "DRAINAGE", "DYNREG", "FIP", "FLORES", "FLOWS", "FREQ",
    "GIMULT", "HYDH", "HYDHFW", "KRG", "KRO", "KRW",
    "NOGRAD", "NORST", "NPMREB", "PBPD", "PCOG", "PCOW",
    "PERMREDN", "POIS", "PORO", "PORV", "POT", "PRES",
    "RFIP", "RK", "ROCKC", "RPORV", "RSSAT", "RVSAT",
    "SAVE", "SDENO", "SFIP", "SFREQ", "SGTRAP", "SIGM_MOD",
    "STREAM", "SURFBLK", "TRAS", "VELGAS", "VELOCITY", "VELOIL",
    "VELWAT", "VISC",
];

/// Mnemonics RPTSCHED recognizes. Sorted, so membership is a binary search.
const RPTSCHED_MNEMONICS: [&str; 105] = [
    "ALKALINE", "ANIONS", "AQUCT", "AQUFET", "AQUFETP", "BFORG",
    "CATIONS", "CPU", "DENG", "DENO", "DENW", "ESALPLY",
    "ESALSUR", "FFORG", "FIP", "FIPFOAM", "FIPHEAT", "FIPRESV",
    "FIPSALT", "FIPSOL", "FIPSURF", "FIPTEMP", "FIPTR", "FIPVE",
    "FLOGAS", "FLOOIL", "FLOSOL", "FLOWAT", "FMISC", "FOAM",
    "FOAMADS", "FOAMCNM", "FOAMDCY", "FOAMMOB", "GASCONC", "GASSATC",
    "GDOWAT", "GI", "GOC", "GOCDIFF", "GRAD", "KRG",
    "KRN", "KRO", "KRW", "MULT", "NEWTON", "NOTHING",
    "NPMREB", "ODGAS", "ODWAT", "OILAPI", "PB", "PBLK",
    "PBU", "PD", "PDEW", "PGAS", "PGASD", "PLYADS",
    "POIL", "POILD", "POLYMER", "POTC", "POTG", "POTO",
    "POTW", "PRES", "PRESSURE", "PWAT", "PWATD", "RECOV",
    "RESTART", "ROCKC", "RS", "RSSAT", "RV", "RVSAT",
    "SALT", "SGAS", "SGTRAP", "SIGM_MOD", "SOIL", "SSOL",
    "SUMMARY", "SURFADS", "SURFBLK", "SWAT", "TBLK", "TEMP",
    "TRACER", "TRADS", "TRDCY", "TUNING", "VFPPROD", "VGAS",
    "VOIL", "VWAT", "WDOGAS", "WELLS", "WELSPECL", "WELSPECS",
    "WOC", "WOCDIFF", "WOCGOC",
];

/// The array set ALLPROPS expands to.
pub(crate) const ALLPROPS_EXPANSION: [&str; 10] = [
    "BG", "BO", "BW", "KRG", "KRO", "KRW", "VOIL", "VGAS", "VWAT", "DEN",
];

pub(crate) fn is_rptrst_mnemonic(name: &str) -> bool {
    RPTRST_MNEMONICS.binary_search(&name).is_ok()
}

pub(crate) fn is_rptsched_mnemonic(name: &str) -> bool {
    RPTSCHED_MNEMONICS.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The membership checks binary-search these tables, so they must stay
    // sorted when entries are added.
    #[test]
    fn test_mnemonic_tables_are_sorted() {
        assert!(RPTRST_MNEMONICS.windows(2).all(|w| w[0] < w[1]));
        assert!(RPTSCHED_MNEMONICS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rptrst_membership() {
        assert!(is_rptrst_mnemonic("BASIC"));
        assert!(is_rptrst_mnemonic("ACIP"));
        assert!(is_rptrst_mnemonic("VELOCITY"));
        assert!(!is_rptrst_mnemonic("RUBBISH"));
        assert!(!is_rptrst_mnemonic("RESTART"));
    }

    #[test]
    fn test_rptsched_membership() {
        assert!(is_rptsched_mnemonic("RESTART"));
        assert!(is_rptsched_mnemonic("NOTHING"));
        assert!(!is_rptsched_mnemonic("BASIC"));
    }

    #[test]
    fn test_positional_slots_match_manual_numbering() {
        assert_eq!(RST_INTEGER_KEYWORDS[0], "BASIC");
        assert_eq!(RST_INTEGER_KEYWORDS[5], "FREQ");
        assert_eq!(RST_INTEGER_KEYWORDS[26], "");
        assert_eq!(SCHED_INTEGER_KEYWORDS[6], "RESTART");
    }
}
