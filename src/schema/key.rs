// src/schema/key.rs

/// Geographic surrogate key: `lower(department) + "_" + lower(municipality)`,
/// spaces replaced by underscores.
///
/// Both the geographic dimension and the fact table derive their key through
/// this function; joins between them rely on exact string equality.
/// Distinct (code, department, municipality) triples can map to one key.
pub fn geo_key(department: &str, municipality: &str) -> String {
    format!("{}_{}", department.to_lowercase(), municipality.to_lowercase()).replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_cases_and_joins_with_underscores() {
        assert_eq!(geo_key("Bogota", "bogota"), "bogota_bogota");
        assert_eq!(geo_key("Valle Del Cauca", "buga la grande"), "valle_del_cauca_buga_la_grande");
    }

    #[test]
    fn collision_between_distinct_pairs_is_possible() {
        assert_eq!(geo_key("San Andres", "x"), geo_key("san", "andres x"));
    }
}
