//! Built-in sample document: a hospital site with five network steps.
//!
//! Used by the `seed` binary to produce a template file, and handy as a
//! realistic fixture.

use crate::model::{AppData, Building, Priority, ProjectConfig, StepDefinition};

const SAMPLE_STEPS: [(&str, &str); 5] = [
    ("cabling", "Câblage"),
    ("sockets", "Prises"),
    ("wifi", "WiFi"),
    ("connection", "Racc."),
    ("test", "Tests"),
];

// id, name, service, level, priority
const SAMPLE_BUILDINGS: [(&str, &str, &str, &str, Priority); 36] = [
    ("1", "Administratif", "Administratif", "RDC", Priority::Haute),
    ("2", "Studio", "Administratif", "RDC", Priority::Haute),
    ("3", "Tuberculose", "Tuberculose", "RDC", Priority::Haute),
    ("4", "Urgences", "Urgences", "RDC", Priority::Haute),
    ("5", "Urgences", "Urgences", "R+1", Priority::Haute),
    ("6", "Bâtiment 01", "Chirurgie Tardive", "RDC", Priority::Moyenne),
    ("7", "Bâtiment 02", "Urgences Pédiatriques", "RDC", Priority::Haute),
    ("8", "Bâtiment 03", "Chirurgie Réveil", "RDC", Priority::Moyenne),
    ("9", "Bâtiment 04", "Médecine Interne", "RDC", Priority::Moyenne),
    ("10", "Bâtiment 05", "Nutrition & Pédiatrie", "RDC", Priority::Moyenne),
    ("11", "Bâtiment 06", "Post-Partum", "RDC", Priority::Basse),
    ("12", "Bâtiment 07", "Gynecologie", "RDC", Priority::Basse),
    ("13", "Maternité", "Maternité", "RDC BAS", Priority::Haute),
    ("14", "Maternité", "Maternité", "RDC HAUT", Priority::Haute),
    ("15", "Maternité", "Maternité", "R+1", Priority::Haute),
    ("16", "Bâtiment 84", "Clinique", "RDC", Priority::Basse),
    ("17", "Bâtiment 88", "Post-Partum", "RDC", Priority::Basse),
    ("18", "Bâtiment 09", "Clinique Post-Partum", "RDC", Priority::Basse),
    ("19", "Bâtiment 10", "Clinique Post-Partum", "R+1", Priority::Basse),
    ("20", "PC Sécurité", "Clinique", "RDC", Priority::Basse),
    ("21", "Accueil", "Administratif", "RDC", Priority::Haute),
    ("22", "Administratif", "", "R+1", Priority::Haute),
    ("23", "Laboratoire/Pharmacie", "Laboratoire/Pharmacie", "RDC", Priority::Haute),
    ("24", "Soins Intensif/Bloc", "Bloc Opératoire/Imagerie", "RDC", Priority::Haute),
    ("25", "SVS", "SVS", "RDC", Priority::Haute),
    ("26", "SVS", "SVS", "R+1", Priority::Haute),
    ("27", "Extension SVS", "SVS", "RDC SAS", Priority::Haute),
    ("28", "Bâtiment GE", "Bâtiment GE", "RDC", Priority::Basse),
    ("29", "Magasin", "Magasin", "RDC", Priority::Basse),
    ("30", "Fondation Baron", "Fondation Baron", "RDC", Priority::Basse),
    ("31", "Psychanalyse", "Psychanalyse", "RDC", Priority::Basse),
    ("32", "Dialyse", "Dialyse", "RDC", Priority::Basse),
    ("33", "Ophtalmologie", "Ophtalmologie", "RDC", Priority::Moyenne),
    ("34", "Morgue", "Morgue", "RDC", Priority::Basse),
    ("35", "Morgue", "Morgue", "R+1", Priority::Basse),
    ("36", "ITM", "ITM", "RDC", Priority::Basse),
];

#[must_use]
pub fn sample_document() -> AppData {
    let config = ProjectConfig {
        name: "Suivi de Chantier".to_owned(),
        subtitle: "Hôpital Central".to_owned(),
        steps: SAMPLE_STEPS
            .iter()
            .map(|(id, label)| StepDefinition::new(*id, *label))
            .collect(),
    };
    let tasks = SAMPLE_BUILDINGS
        .iter()
        .map(|(id, name, service, level, priority)| {
            Building::new(*id, *name, *service, *level, *priority)
        })
        .collect();
    AppData::new(config, tasks)
}
