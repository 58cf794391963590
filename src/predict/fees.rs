//! Annual fee estimate by funding type.

use crate::domain::{CollegeType, FeeEstimate};

/// Hostel fee is the same regardless of funding type.
pub const HOSTEL_FEE: u32 = 40_000;

pub fn tuition_fee(college_type: CollegeType) -> u32 {
    match college_type {
        CollegeType::Government => 50_000,
        CollegeType::Aided => 75_000,
        CollegeType::SelfFinancing => 150_000,
    }
}

pub fn estimate_fees(college_type: CollegeType) -> FeeEstimate {
    let tuition = tuition_fee(college_type);
    FeeEstimate {
        tuition,
        hostel: HOSTEL_FEE,
        total: tuition + HOSTEL_FEE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_per_type() {
        assert_eq!(estimate_fees(CollegeType::Government).total, 90_000);
        assert_eq!(estimate_fees(CollegeType::Aided).total, 115_000);
        assert_eq!(estimate_fees(CollegeType::SelfFinancing).total, 190_000);

        for t in CollegeType::ALL {
            let fees = estimate_fees(t);
            assert_eq!(fees.tuition + fees.hostel, fees.total);
            assert_eq!(fees.hostel, HOSTEL_FEE);
        }
    }
}
