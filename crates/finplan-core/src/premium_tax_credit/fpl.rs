use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Federal Poverty Level tables
// ---------------------------------------------------------------------------

/// FPL guideline region. Alaska and Hawaii publish their own tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Contiguous48,
    Alaska,
    Hawaii,
}

const MAX_TABLE_FAMILY_SIZE: u32 = 8;

/// Guidelines for family sizes 1-8 plus the per-person increment beyond 8.
struct FplTable {
    amounts: [Decimal; 8],
    additional_person: Decimal,
}

const FPL_2024_CONTIGUOUS: FplTable = FplTable {
    amounts: [
        dec!(15060),
        dec!(20440),
        dec!(25820),
        dec!(31200),
        dec!(36580),
        dec!(41960),
        dec!(47340),
        dec!(52720),
    ],
    additional_person: dec!(5380),
};

const FPL_2024_ALASKA: FplTable = FplTable {
    amounts: [
        dec!(18810),
        dec!(25540),
        dec!(32270),
        dec!(39000),
        dec!(45730),
        dec!(52460),
        dec!(59190),
        dec!(65920),
    ],
    additional_person: dec!(6730),
};

const FPL_2024_HAWAII: FplTable = FplTable {
    amounts: [
        dec!(17310),
        dec!(23500),
        dec!(29690),
        dec!(35880),
        dec!(42070),
        dec!(48260),
        dec!(54450),
        dec!(60640),
    ],
    additional_person: dec!(6190),
};

const FPL_2025_CONTIGUOUS: FplTable = FplTable {
    amounts: [
        dec!(15650),
        dec!(21150),
        dec!(26650),
        dec!(32150),
        dec!(37650),
        dec!(43150),
        dec!(48650),
        dec!(54150),
    ],
    additional_person: dec!(5500),
};

const FPL_2025_ALASKA: FplTable = FplTable {
    amounts: [
        dec!(19550),
        dec!(26430),
        dec!(33310),
        dec!(40190),
        dec!(47070),
        dec!(53950),
        dec!(60830),
        dec!(67710),
    ],
    additional_person: dec!(6880),
};

const FPL_2025_HAWAII: FplTable = FplTable {
    amounts: [
        dec!(17990),
        dec!(24320),
        dec!(30650),
        dec!(36980),
        dec!(43310),
        dec!(49640),
        dec!(55970),
        dec!(62300),
    ],
    additional_person: dec!(6330),
};

const FPL_2026_CONTIGUOUS: FplTable = FplTable {
    amounts: [
        dec!(16100),
        dec!(21710),
        dec!(27320),
        dec!(32930),
        dec!(38540),
        dec!(44150),
        dec!(49760),
        dec!(55370),
    ],
    additional_person: dec!(5610),
};

const FPL_2026_ALASKA: FplTable = FplTable {
    amounts: [
        dec!(20130),
        dec!(27140),
        dec!(34150),
        dec!(41160),
        dec!(48170),
        dec!(55180),
        dec!(62190),
        dec!(69200),
    ],
    additional_person: dec!(7010),
};

const FPL_2026_HAWAII: FplTable = FplTable {
    amounts: [
        dec!(18520),
        dec!(24970),
        dec!(31420),
        dec!(37870),
        dec!(44320),
        dec!(50770),
        dec!(57220),
        dec!(63670),
    ],
    additional_person: dec!(6450),
};

fn table_for(tax_year: i32, location: Location) -> &'static FplTable {
    match (tax_year, location) {
        (2024, Location::Contiguous48) => &FPL_2024_CONTIGUOUS,
        (2024, Location::Alaska) => &FPL_2024_ALASKA,
        (2024, Location::Hawaii) => &FPL_2024_HAWAII,
        (2025, Location::Contiguous48) => &FPL_2025_CONTIGUOUS,
        (2025, Location::Alaska) => &FPL_2025_ALASKA,
        (2025, Location::Hawaii) => &FPL_2025_HAWAII,
        (2026, Location::Contiguous48) => &FPL_2026_CONTIGUOUS,
        (2026, Location::Alaska) => &FPL_2026_ALASKA,
        (2026, Location::Hawaii) => &FPL_2026_HAWAII,
        // Unrecognized years fall back to the latest published table
        (_, Location::Contiguous48) => &FPL_2026_CONTIGUOUS,
        (_, Location::Alaska) => &FPL_2026_ALASKA,
        (_, Location::Hawaii) => &FPL_2026_HAWAII,
    }
}

/// Federal Poverty Level for the household. Family sizes beyond 8 grow by a
/// fixed per-person increment. Callers guard `family_size == 0`.
pub fn get_fpl(tax_year: i32, location: Location, family_size: u32) -> Money {
    let table = table_for(tax_year, location);
    let size = family_size.max(1);
    if size <= MAX_TABLE_FAMILY_SIZE {
        table.amounts[(size - 1) as usize]
    } else {
        table.amounts[(MAX_TABLE_FAMILY_SIZE - 1) as usize]
            + table.additional_person * Decimal::from(size - MAX_TABLE_FAMILY_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Applicable figure
// ---------------------------------------------------------------------------

// Income bands in % of FPL with the contribution rate at each edge. The
// 0-150 band is fixed at zero and income at or above 400% pays the flat top
// rate.
const BAND_EDGES: [(Decimal, Rate); 5] = [
    (dec!(150), dec!(0.00)),
    (dec!(200), dec!(0.02)),
    (dec!(250), dec!(0.04)),
    (dec!(300), dec!(0.06)),
    (dec!(400), dec!(0.085)),
];

const TOP_RATE: Rate = dec!(0.085);

/// Applicable contribution percentage (as a decimal rate) for household
/// income expressed as a percent of FPL. Piecewise-linear between band
/// edges and continuous at every boundary.
pub fn applicable_figure(fpl_percentage: Decimal) -> Rate {
    let (first_edge, first_rate) = BAND_EDGES[0];
    if fpl_percentage < first_edge {
        return first_rate;
    }

    for window in BAND_EDGES.windows(2) {
        let (lo_edge, lo_rate) = window[0];
        let (hi_edge, hi_rate) = window[1];
        if fpl_percentage < hi_edge {
            return lo_rate + (fpl_percentage - lo_edge) / (hi_edge - lo_edge) * (hi_rate - lo_rate);
        }
    }

    TOP_RATE
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
