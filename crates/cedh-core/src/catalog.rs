//! The indicator catalog: which indicators each area reports on.
//!
//! The catalog is the source of truth for which indicator ids are legal for a
//! given area. Observations carry a denormalized copy of the indicator name so
//! that the audit trail survives later renames here.

use serde::{Deserialize, Serialize};

// ─── Built-in table ──────────────────────────────────────────────────────────

const VISITADURIA_GENERAL: &[(&str, &str)] = &[
  ("7", "Expedientes de queja iniciados"),
  ("7.1", "Iniciados a petición de parte"),
  ("7.2", "Iniciados de manera oficiosa"),
  ("7.4", "Expedientes recibidos inter-turnados"),
  ("7.5", "Expedientes enviados inter-turnados"),
  ("10", "Expedientes de queja concluidos"),
  ("10.1", "Por haberse solucionado durante el trámite"),
  ("10.2", "Por conciliaciones"),
  ("10.3", "Por recomendaciones"),
  ("10.4", "Por otro tipo de conclusión"),
  ("13", "Medidas cautelares iniciadas"),
  // Trailing space matches the rows already stored in the shared sheet.
  ("14", "Medidas cautelares concluidas "),
  ("17", "Recomendaciones emitidas"),
];

const TERCERA_VISITADURIA: &[(&str, &str)] = &[
  (
    "2.6",
    "Personas atendidas en Centros de Reinserción Social e Internamiento de menores infractores",
  ),
  ("7", "Expedientes de queja iniciados"),
  ("7.1", "Iniciados a petición de parte"),
  ("7.2", "Iniciados de manera oficiosa"),
  ("7.3", "Expedientes de queja iniciados en materia Penitenciaria"),
  ("7.4", "Expedientes recibidos inter-turnados"),
  ("7.5", "Expedientes enviados inter-turnados"),
  ("8", "Visitas de Supervisión Penitenciaria"),
  ("8.1", "Acciones del Mecanismo penitenciario (buzones)"),
  (
    "9.2",
    "Número de visitas a Separos de Seguridad Pública del Estado y Municipios",
  ),
  ("10", "Expedientes de queja concluidos"),
  ("10.1", "Por haberse solucionado durante el trámite"),
  ("10.2", "Por conciliaciones"),
  ("10.3", "Por recomendaciones"),
  ("10.4", "Por otro tipo de conclusión"),
  ("13", "Medidas cautelares iniciadas"),
  (
    "13.1",
    "Medidas cautelares iniciadas con motivos de asuntos penitenciarios",
  ),
  ("14", "Medidas cautelares concluidas "),
  ("17", "Recomendaciones emitidas"),
];

const DORQ: &[(&str, &str)] = &[
  ("2.1", "Atención Oficinas Centrales"),
  ("6.1", "Orientaciones"),
  ("9", "Prevención Tortura"),
];

const CAV: &[(&str, &str)] = &[
  ("15", "Atención Víctimas"),
  ("17", "Protocolos Estambul"),
];

const BUILTIN: &[(&str, &[(&str, &str)])] = &[
  ("1VG", VISITADURIA_GENERAL),
  ("2VG", VISITADURIA_GENERAL),
  ("3VG", TERCERA_VISITADURIA),
  ("DORQ", DORQ),
  ("CAV", CAV),
];

// ─── Types ───────────────────────────────────────────────────────────────────

/// A named monthly metric, identified by a short code such as `"7.1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
  pub id:   String,
  pub name: String,
}

/// The ordered indicator list for one area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaIndicators {
  pub area:       String,
  pub indicators: Vec<Indicator>,
}

/// Static mapping `area → ordered [indicator]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorCatalog {
  areas: Vec<AreaIndicators>,
}

impl IndicatorCatalog {
  /// The catalog used by the commission's regional offices.
  pub fn builtin() -> Self {
    Self::from_table(BUILTIN)
  }

  /// Build a catalog from a borrowed `(area, [(id, name)])` table, keeping
  /// its order.
  pub fn from_table(table: &[(&str, &[(&str, &str)])]) -> Self {
    let areas = table
      .iter()
      .map(|(area, indicators)| AreaIndicators {
        area:       (*area).to_owned(),
        indicators: indicators
          .iter()
          .map(|(id, name)| Indicator {
            id:   (*id).to_owned(),
            name: (*name).to_owned(),
          })
          .collect(),
      })
      .collect();
    Self { areas }
  }

  /// Area codes in catalog order.
  pub fn areas(&self) -> impl Iterator<Item = &str> {
    self.areas.iter().map(|a| a.area.as_str())
  }

  pub fn contains_area(&self, area: &str) -> bool {
    self.areas.iter().any(|a| a.area == area)
  }

  /// Indicators for `area` in form order. Unknown areas (such as the
  /// administrators' pseudo-area) have no indicators.
  pub fn indicators(&self, area: &str) -> &[Indicator] {
    self
      .areas
      .iter()
      .find(|a| a.area == area)
      .map(|a| a.indicators.as_slice())
      .unwrap_or(&[])
  }

  pub fn indicator(&self, area: &str, indicator_id: &str) -> Option<&Indicator> {
    self.indicators(area).iter().find(|i| i.id == indicator_id)
  }

  /// Form position of `indicator_id` within `area`.
  pub fn position(&self, area: &str, indicator_id: &str) -> Option<usize> {
    self.indicators(area).iter().position(|i| i.id == indicator_id)
  }
}

impl Default for IndicatorCatalog {
  fn default() -> Self { Self::builtin() }
}
