//! Local folder tree and test-plan document for one HU.
//!
//! Layout produced under the working directory:
//!
//! ```text
//! <HU stem>/
//! ├── Estrategias de pruebas/
//! │   └── Test Plan - <HU stem>.txt
//! ├── Analisis y diseño de las pruebas/
//! └── Ejecucion de pruebas/
//! ```

use chrono::{DateTime, Local};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::filter::stem_of;

/// Phase folders created for every HU, in workflow order.
pub const PHASE_FOLDERS: [&str; 3] = [
    "Estrategias de pruebas",
    "Analisis y diseño de las pruebas",
    "Ejecucion de pruebas",
];

/// Folder holding the test plan.
pub const STRATEGY_FOLDER: &str = PHASE_FOLDERS[0];

const TEST_PLAN_TEMPLATE: &str = "\
========================================
TEST PLAN GENERADO AUTOMÁTICAMENTE
========================================
Archivo Origen: {{source}}
Fecha Generacion: {{generated_at}}
{{#if xray_key}}
Test Plan Xray: {{xray_key}}
{{/if}}

1. ALCANCE
   - Pruebas funcionales para la historia: {{stem}}

2. ESTRATEGIAS
   - Tipos de prueba: Funcionales, Regresión.

3. RECURSOS y HERRAMIENTAS
   - Jira / Xray

4. CRITERIOS DE ACEPTACIÓN
   (A definir según análisis de la HU adjunta)
{{#if excerpt}}

5. RESUMEN DE LA HU
{{excerpt}}
{{/if}}
";

/// Optional details that enrich a test plan.
#[derive(Debug, Clone, Default)]
pub struct PlanDetails {
    /// Text extracted from the HU document.
    pub hu_text: Option<String>,
    /// Key of the Test Plan issue created in Xray.
    pub xray_key: Option<String>,
    /// Generation time; defaults to now.
    pub generated_at: Option<DateTime<Local>>,
}

#[derive(Serialize)]
struct TemplateData<'a> {
    source: &'a str,
    stem: &'a str,
    generated_at: String,
    xray_key: Option<&'a str>,
    excerpt: Option<String>,
}

/// Builds HU folder trees and renders their test plans.
pub struct Organizer {
    handlebars: Handlebars<'static>,
    excerpt_chars: usize,
}

impl Organizer {
    /// Create an organizer copying at most `excerpt_chars` characters of
    /// HU text into each plan (0 leaves the summary section out).
    pub fn new(excerpt_chars: usize) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string("test_plan", TEST_PLAN_TEMPLATE)?;

        Ok(Self {
            handlebars,
            excerpt_chars,
        })
    }

    /// Render the test plan text for the HU file `filename`.
    pub fn render(&self, filename: &str, details: &PlanDetails) -> Result<String> {
        let generated_at = details.generated_at.unwrap_or_else(Local::now);
        let excerpt = details
            .hu_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty() && self.excerpt_chars > 0)
            .map(|text| truncate_chars(text, self.excerpt_chars));

        let data = TemplateData {
            source: filename,
            stem: stem_of(filename),
            generated_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            xray_key: details.xray_key.as_deref(),
            excerpt,
        };

        Ok(self.handlebars.render("test_plan", &data)?)
    }

    /// Create `base/<stem>/` with the phase folders and write the test plan
    /// into the strategy folder, returning the plan's path.
    ///
    /// Existing folders are reused and an existing plan is overwritten.
    pub fn generate_folder_structure(
        &self,
        base: &Path,
        filename: &str,
        details: &PlanDetails,
    ) -> Result<PathBuf> {
        let stem = stem_of(filename);
        let root = base.join(stem);

        for folder in PHASE_FOLDERS {
            let dir = root.join(folder);
            std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }

        let plan_path = root
            .join(STRATEGY_FOLDER)
            .join(format!("Test Plan - {stem}.txt"));
        let content = self.render(filename, details)?;
        std::fs::write(&plan_path, content).map_err(|e| Error::io(&plan_path, e))?;

        info!(path = %plan_path.display(), "Wrote test plan");
        Ok(plan_path)
    }
}

/// Truncate text to `max` characters, respecting UTF-8 boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_render_base_sections() {
        let organizer = Organizer::new(100).unwrap();
        let details = PlanDetails {
            generated_at: Some(fixed_time()),
            ..Default::default()
        };

        let text = organizer.render("HU_login.docx", &details).unwrap();
        assert!(text.starts_with("========================================\nTEST PLAN GENERADO AUTOMÁTICAMENTE"));
        assert!(text.contains("Archivo Origen: HU_login.docx"));
        assert!(text.contains("Fecha Generacion: 2026-03-14 09:30:00"));
        assert!(text.contains("Pruebas funcionales para la historia: HU_login"));
        assert!(text.contains("4. CRITERIOS DE ACEPTACIÓN"));
        assert!(!text.contains("RESUMEN DE LA HU"));
        assert!(!text.contains("Test Plan Xray"));
    }

    #[test]
    fn test_render_does_not_escape() {
        let organizer = Organizer::new(100).unwrap();
        let details = PlanDetails {
            hu_text: Some("Validar <usuario> & \"clave\"".to_string()),
            xray_key: Some("QA-99".to_string()),
            generated_at: Some(fixed_time()),
        };

        let text = organizer.render("HU_<raro>.txt", &details).unwrap();
        assert!(text.contains("Archivo Origen: HU_<raro>.txt"));
        assert!(text.contains("5. RESUMEN DE LA HU\nValidar <usuario> & \"clave\""));
        assert!(text.contains("Test Plan Xray: QA-99"));
    }

    #[test]
    fn test_excerpt_is_truncated() {
        let organizer = Organizer::new(5).unwrap();
        let details = PlanDetails {
            hu_text: Some("ñandú corre rápido".to_string()),
            ..Default::default()
        };

        let text = organizer.render("HU_ave.txt", &details).unwrap();
        assert!(text.contains("ñandú..."));
        assert!(!text.contains("corre"));
    }

    #[test]
    fn test_zero_excerpt_disables_summary() {
        let organizer = Organizer::new(0).unwrap();
        let details = PlanDetails {
            hu_text: Some("contenido".to_string()),
            ..Default::default()
        };

        let text = organizer.render("HU_x.txt", &details).unwrap();
        assert!(!text.contains("RESUMEN"));
    }

    #[test]
    fn test_generate_folder_structure() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(100).unwrap();

        let plan = organizer
            .generate_folder_structure(dir.path(), "HU_pagos.v2.pdf", &PlanDetails::default())
            .unwrap();

        let root = dir.path().join("HU_pagos.v2");
        for folder in PHASE_FOLDERS {
            assert!(root.join(folder).is_dir(), "missing {folder}");
        }
        assert_eq!(
            plan,
            root.join("Estrategias de pruebas")
                .join("Test Plan - HU_pagos.v2.txt")
        );
        let content = std::fs::read_to_string(&plan).unwrap();
        assert!(content.contains("Archivo Origen: HU_pagos.v2.pdf"));

        // Running again reuses the tree and overwrites the plan.
        let again = organizer
            .generate_folder_structure(dir.path(), "HU_pagos.v2.pdf", &PlanDetails::default())
            .unwrap();
        assert_eq!(plan, again);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
    }
}
