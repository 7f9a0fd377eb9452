//! Organic waste classification

use serde::{Deserialize, Serialize};

/// Kind of organic waste traded on the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WasteType {
    /// Manure
    Estiercol,
    /// Sugar-cane or fruit bagasse
    Bagazo,
    PulpaVegetal,
    CascaraFrutas,
    ResiduosLacteos,
    ResiduosMatadero,
    LodosOrganicos,
    Otro,
}

wire_enum!(WasteType, "waste type", {
    Estiercol => "estiercol",
    Bagazo => "bagazo",
    PulpaVegetal => "pulpa_vegetal",
    CascaraFrutas => "cascara_frutas",
    ResiduosLacteos => "residuos_lacteos",
    ResiduosMatadero => "residuos_matadero",
    LodosOrganicos => "lodos_organicos",
    Otro => "otro",
});

impl WasteType {
    pub const ALL: [WasteType; 8] = [
        WasteType::Estiercol,
        WasteType::Bagazo,
        WasteType::PulpaVegetal,
        WasteType::CascaraFrutas,
        WasteType::ResiduosLacteos,
        WasteType::ResiduosMatadero,
        WasteType::LodosOrganicos,
        WasteType::Otro,
    ];

    /// Display label shown in the marketplace
    pub fn label(&self) -> &'static str {
        match self {
            WasteType::Estiercol => "Estiércol",
            WasteType::Bagazo => "Bagazo",
            WasteType::PulpaVegetal => "Pulpa Vegetal",
            WasteType::CascaraFrutas => "Cáscara de Frutas",
            WasteType::ResiduosLacteos => "Residuos Lácteos",
            WasteType::ResiduosMatadero => "Residuos de Matadero",
            WasteType::LodosOrganicos => "Lodos Orgánicos",
            WasteType::Otro => "Otro",
        }
    }

    /// Lenient lookup for display: unknown values fall back to `Otro`
    pub fn from_str_or_other(s: &str) -> Self {
        s.parse().unwrap_or(WasteType::Otro)
    }
}

/// How often a seller can supply a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Unica,
    Semanal,
    Mensual,
    Continua,
}

wire_enum!(Frequency, "frequency", {
    Unica => "unica",
    Semanal => "semanal",
    Mensual => "mensual",
    Continua => "continua",
});

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Unica => "Única vez",
            Frequency::Semanal => "Semanal",
            Frequency::Mensual => "Mensual",
            Frequency::Continua => "Continua",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waste_type_wire_names_round_trip() {
        for waste_type in WasteType::ALL {
            assert_eq!(waste_type.as_str().parse::<WasteType>(), Ok(waste_type));
        }
    }

    #[test]
    fn test_unknown_waste_type_displays_as_other() {
        assert_eq!(WasteType::from_str_or_other("plastico"), WasteType::Otro);
        assert_eq!(WasteType::from_str_or_other("plastico").label(), "Otro");
        assert_eq!(WasteType::from_str_or_other("bagazo"), WasteType::Bagazo);
    }

    #[test]
    fn test_serde_matches_wire_name() {
        let json = serde_json::to_string(&WasteType::ResiduosLacteos).unwrap();
        assert_eq!(json, "\"residuos_lacteos\"");
        let frequency: Frequency = serde_json::from_str("\"semanal\"").unwrap();
        assert_eq!(frequency, Frequency::Semanal);
    }
}
