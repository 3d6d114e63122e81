//! Sector classification.
//!
//! Two scoring modes, both pure:
//! - text: keyword substring hits over lowercased free text, one point per
//!   matching keyword
//! - codes: CZ-NACE two-digit prefixes mapped to sectors, weighted so that
//!   distinctive sectors outscore generic ones
//!
//! Ties go to the earlier sector in [`Sector::PRIORITY`]; no signal means
//! [`Sector::Other`].

use subjekt_shared::Sector;
use subjekt_sources::SectorSignal;

/// Keyword table, Czech and English stems. Entries padded with spaces only
/// match whole words.
const KEYWORDS: &[(Sector, &[&str])] = &[
    (
        Sector::It,
        &[
            "software", " it ", "informační", "informatik", "počítač", "programov", "vývoj aplikací",
            "web", "cloud", "hosting", "data", "digital", "tech", "kyber", "cyber", " ai ",
        ],
    ),
    (
        Sector::Finance,
        &[
            "bank", "banka", "financ", "invest", "pojišť", "pojišt", "insurance", "úvěr", "leasing",
            "účetn", "accounting", "kapitál", "capital", " fin",
        ],
    ),
    (
        Sector::Healthcare,
        &[
            "zdravot", "nemocnic", "klinik", "clinic", "lékař", "lékárn", "ordinac", "medic",
            "health", "pharma", "farmac", "stomatolog", "zubní", "rehabilit", "care",
        ],
    ),
    (
        Sector::Manufacturing,
        &[
            "výrob", "strojír", "strojn", "továrn", "průmysl", "kovo", "manufact", "factory",
            "industr", "slévár", "montáž", "production",
        ],
    ),
    (
        Sector::Retail,
        &[
            "obchod", "prodej", "e-shop", "eshop", "shop", "store", "retail", "market", "potravin",
            "butik",
        ],
    ),
];

/// Weight per matching classification code.
fn code_weight(sector: Sector) -> u32 {
    match sector {
        Sector::It | Sector::Finance | Sector::Healthcare => 3,
        Sector::Manufacturing => 2,
        Sector::Retail => 1,
        Sector::Other => 0,
    }
}

/// CZ-NACE division (two-digit prefix) → sector.
fn sector_for_division(division: u32) -> Option<Sector> {
    match division {
        58..=63 => Some(Sector::It),
        64..=66 => Some(Sector::Finance),
        86..=88 => Some(Sector::Healthcare),
        10..=33 => Some(Sector::Manufacturing),
        45..=47 => Some(Sector::Retail),
        _ => None,
    }
}

/// Per-sector running totals indexed by [`Sector::rank`].
#[derive(Default)]
struct Scores([u32; 6]);

impl Scores {
    fn add(&mut self, sector: Sector, points: u32) {
        self.0[sector.rank()] += points;
    }

    /// Highest score, earliest priority on ties, `Other` when nothing scored.
    fn winner(&self) -> Sector {
        let mut best = Sector::Other;
        let mut best_score = 0;
        for sector in Sector::PRIORITY {
            let score = self.0[sector.rank()];
            if score > best_score {
                best = sector;
                best_score = score;
            }
        }
        best
    }
}

/// Classify free text (typically name + description).
pub fn classify_text(text: &str) -> Sector {
    let haystack = format!(" {} ", text.to_lowercase());
    let mut scores = Scores::default();

    for (sector, keywords) in KEYWORDS {
        for keyword in *keywords {
            if haystack.contains(keyword) {
                scores.add(*sector, 1);
            }
        }
    }

    scores.winner()
}

/// Classify a list of CZ-NACE codes.
pub fn classify_codes<S: AsRef<str>>(codes: &[S]) -> Sector {
    let mut scores = Scores::default();

    for code in codes {
        let Some(division) = code
            .as_ref()
            .trim()
            .get(..2)
            .filter(|p| p.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|p| p.parse::<u32>().ok())
        else {
            continue;
        };
        if let Some(sector) = sector_for_division(division) {
            scores.add(sector, code_weight(sector));
        }
    }

    scores.winner()
}

/// Resolve a candidate's sector from whatever signal its source produced.
pub fn classify(signal: &SectorSignal) -> Sector {
    match signal {
        SectorSignal::Text(text) => classify_text(text),
        SectorSignal::Codes(codes) => classify_codes(codes),
        SectorSignal::Known(sector) => *sector,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_mode_picks_highest_score() {
        assert_eq!(
            classify_text("Pražská Investiční Banka a.s. Banka pro firemní klienty, investice a úvěry."),
            Sector::Finance
        );
        assert_eq!(
            classify_text("Kodex Software s.r.o. Vývoj software a cloud hosting pro e-shopy."),
            Sector::It
        );
        assert_eq!(classify_text("Zubní ordinace MUDr. Nováková"), Sector::Healthcare);
        assert_eq!(classify_text("Strojírna Vysočina, výroba ocelových dílů"), Sector::Manufacturing);
        assert_eq!(classify_text("Potraviny U Nádraží, prodejna"), Sector::Retail);
    }

    #[test]
    fn text_mode_defaults_to_other() {
        assert_eq!(classify_text("Bistro Na Rohu Restaurace a kavárna."), Sector::Other);
        assert_eq!(classify_text(""), Sector::Other);
    }

    #[test]
    fn text_mode_ties_follow_priority() {
        // One IT hit ("software"), one Retail hit ("obchod").
        assert_eq!(classify_text("software obchod"), Sector::It);
        // One Healthcare hit ("klinik"), one Manufacturing hit ("kovo").
        assert_eq!(classify_text("klinika kovo"), Sector::Healthcare);
    }

    #[test]
    fn padded_keywords_match_whole_words_only() {
        assert_eq!(classify_text("IT služby"), Sector::It);
        assert_eq!(classify_text("Kvalita služby"), Sector::Other);
    }

    #[test]
    fn code_mode_weights_distinctive_sectors() {
        // IT = 3, Finance = 3 → priority picks IT.
        assert_eq!(classify_codes(&["62010", "64910"]), Sector::It);
        // Manufacturing 2 + 2 = 4 beats Finance 3.
        assert_eq!(classify_codes(&["25110", "28990", "64190"]), Sector::Manufacturing);
        // Retail 1 + 1 = 2 loses to Healthcare 3.
        assert_eq!(classify_codes(&["47110", "47190", "86210"]), Sector::Healthcare);
    }

    #[test]
    fn code_mode_ignores_unknown_and_garbage() {
        assert_eq!(classify_codes(&["01110", "x1", "", "9"]), Sector::Other);
        assert_eq!(classify_codes::<&str>(&[]), Sector::Other);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Alfa Pojišťovna a.s. Pojištění majetku a leasing.";
        let first = classify_text(text);
        for _ in 0..10 {
            assert_eq!(classify_text(text), first);
        }
        assert_eq!(first, Sector::Finance);
    }

    #[test]
    fn known_signal_passes_through() {
        assert_eq!(classify(&SectorSignal::Known(Sector::Retail)), Sector::Retail);
        assert_eq!(
            classify(&SectorSignal::Codes(vec!["62010".into(), "64910".into()])),
            Sector::It
        );
    }
}
