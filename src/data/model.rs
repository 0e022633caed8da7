// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ALTITUDE_KM: &str = "Altitude_km";
pub const DELTA_V_MS: &str = "DeltaV_ms";
pub const DECAY_TIME_YEARS: &str = "DecayTime_years";
pub const ESA_COMPLIANT: &str = "ESA_Compliant";

/// Every column a deorbit table must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 4] = [ALTITUDE_KM, DELTA_V_MS, DECAY_TIME_YEARS, ESA_COMPLIANT];

// ---------------------------------------------------------------------------
// DeorbitRecord – one row of the analysis table
// ---------------------------------------------------------------------------

/// A single analysed orbit (one row of the source table).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeorbitRecord {
    /// Initial circular-orbit altitude in km.
    pub altitude_km: f64,
    /// Delta-V needed for an active deorbit burn, m/s.
    pub delta_v_ms: f64,
    /// Natural decay time in years.
    pub decay_time_years: f64,
    /// Whether natural decay meets the ESA 25-year rule.
    pub esa_compliant: bool,
}

impl DeorbitRecord {
    pub fn new(altitude_km: f64, delta_v_ms: f64, decay_time_years: f64, esa_compliant: bool) -> Self {
        Self {
            altitude_km,
            delta_v_ms,
            decay_time_years,
            esa_compliant,
        }
    }
}

// ---------------------------------------------------------------------------
// DeorbitTable – the complete loaded table
// ---------------------------------------------------------------------------

/// Rows in source-file order. Duplicate altitudes are kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeorbitTable {
    pub records: Vec<DeorbitRecord>,
}

impl DeorbitTable {
    pub fn from_records(records: Vec<DeorbitRecord>) -> Self {
        DeorbitTable { records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeorbitRecord> {
        self.records.iter()
    }

    /// Count of rows flagged ESA compliant.
    pub fn compliant_count(&self) -> usize {
        self.records.iter().filter(|r| r.esa_compliant).count()
    }
}

impl<'a> IntoIterator for &'a DeorbitTable {
    type Item = &'a DeorbitRecord;
    type IntoIter = std::slice::Iter<'a, DeorbitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
