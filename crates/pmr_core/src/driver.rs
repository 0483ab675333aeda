//! Fictitious vehicle and driver attached to a taxi leg when it is taken in
//! charge. Deterministic under a seeded RNG.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const MODELS: [&str; 8] = [
    "Peugeot e-208",
    "Renault Zoé",
    "Tesla Model 3",
    "Mercedes Classe E",
    "BMW Série 5",
    "Audi A4",
    "Volkswagen ID.4",
    "Toyota Prius",
];

const COLOURS: [&str; 6] = ["Blanc", "Noir", "Gris", "Bleu", "Rouge", "Argenté"];

const FIRST_NAMES: [&str; 10] = [
    "Jean", "Pierre", "Michel", "Philippe", "Marie", "Sophie", "Laurent", "François", "Nicolas",
    "Thomas",
];

const LAST_NAMES: [&str; 10] = [
    "Dupont", "Martin", "Bernard", "Petit", "Robert", "Richard", "Durand", "Leroy", "Moreau",
    "Simon",
];

const BODY_TYPE: &str = "berline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfo {
    #[serde(rename = "plaque")]
    pub plate: String,
    #[serde(rename = "modele")]
    pub model: String,
    #[serde(rename = "couleur")]
    pub colour: String,
    #[serde(rename = "type")]
    pub body_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverInfo {
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    /// Between 4.0 and 5.0, one decimal.
    #[serde(rename = "note")]
    pub rating: f64,
    #[serde(rename = "nb_courses")]
    pub completed_rides: u32,
    #[serde(rename = "telephone")]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiAssignment {
    #[serde(rename = "vehicule_info")]
    pub vehicle: VehicleInfo,
    #[serde(rename = "chauffeur_info")]
    pub driver: DriverInfo,
}

impl TaxiAssignment {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let vehicle = VehicleInfo {
            plate: plate(rng),
            model: pick(&MODELS, rng),
            colour: pick(&COLOURS, rng),
            body_type: BODY_TYPE.to_string(),
        };
        let driver = DriverInfo {
            first_name: pick(&FIRST_NAMES, rng),
            last_name: pick(&LAST_NAMES, rng),
            rating: f64::from(rng.gen_range(40..=50u32)) / 10.0,
            completed_rides: rng.gen_range(500..3500),
            phone: phone(rng),
        };
        Self { vehicle, driver }
    }
}

fn pick<R: Rng + ?Sized>(choices: &[&str], rng: &mut R) -> String {
    choices.choose(rng).copied().unwrap_or_default().to_string()
}

fn letters<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..2).map(|_| char::from(rng.gen_range(b'A'..=b'Z'))).collect()
}

/// French SIV format, e.g. `AB-123-CD`.
fn plate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let head = letters(rng);
    let digits = rng.gen_range(100..1000);
    let tail = letters(rng);
    format!("{head}-{digits}-{tail}")
}

fn phone<R: Rng + ?Sized>(rng: &mut R) -> String {
    let groups: Vec<String> = (0..4)
        .map(|_| rng.gen_range(10..100).to_string())
        .collect();
    format!("06 {}", groups.join(" "))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn same_seed_same_assignment() {
        let a = TaxiAssignment::generate(&mut StdRng::seed_from_u64(42));
        let b = TaxiAssignment::generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn generated_fields_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let assignment = TaxiAssignment::generate(&mut rng);
            let plate: Vec<&str> = assignment.vehicle.plate.split('-').collect();
            assert_eq!(plate.len(), 3);
            assert!(plate[0].len() == 2 && plate[0].chars().all(|c| c.is_ascii_uppercase()));
            assert!(plate[1].len() == 3 && plate[1].chars().all(|c| c.is_ascii_digit()));
            assert!(plate[2].len() == 2 && plate[2].chars().all(|c| c.is_ascii_uppercase()));

            assert!(MODELS.contains(&assignment.vehicle.model.as_str()));
            assert!(COLOURS.contains(&assignment.vehicle.colour.as_str()));
            assert_eq!(assignment.vehicle.body_type, "berline");

            let driver = &assignment.driver;
            assert!((4.0..=5.0).contains(&driver.rating));
            assert!((500..3500).contains(&driver.completed_rides));
            assert!(driver.phone.starts_with("06 "));
            assert_eq!(driver.phone.split(' ').count(), 5);
        }
    }

    #[test]
    fn serializes_with_record_keys() {
        let assignment = TaxiAssignment::generate(&mut StdRng::seed_from_u64(1));
        let json = serde_json::to_value(&assignment).expect("serialize");
        assert!(json["vehicule_info"]["plaque"].is_string());
        assert!(json["chauffeur_info"]["nb_courses"].is_u64());
    }
}
