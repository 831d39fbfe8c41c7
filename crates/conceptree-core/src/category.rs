use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PrincipleCategory {
    Structural,
    Mechanical,
    Electrical,
    Thermal,
    Chemical,
    Material,
    System,
    Process,
    Design,
    Other,
}

impl PrincipleCategory {
    pub const ALL: [PrincipleCategory; 10] = [
        PrincipleCategory::Structural,
        PrincipleCategory::Mechanical,
        PrincipleCategory::Electrical,
        PrincipleCategory::Thermal,
        PrincipleCategory::Chemical,
        PrincipleCategory::Material,
        PrincipleCategory::System,
        PrincipleCategory::Process,
        PrincipleCategory::Design,
        PrincipleCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PrincipleCategory::Structural => "Structural",
            PrincipleCategory::Mechanical => "Mechanical",
            PrincipleCategory::Electrical => "Electrical",
            PrincipleCategory::Thermal => "Thermal",
            PrincipleCategory::Chemical => "Chemical",
            PrincipleCategory::Material => "Material",
            PrincipleCategory::System => "System",
            PrincipleCategory::Process => "Process",
            PrincipleCategory::Design => "Design",
            PrincipleCategory::Other => "Other",
        }
    }

    /// Case-insensitive lookup; anything unrecognised is `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(label))
            .unwrap_or(PrincipleCategory::Other)
    }
}

impl<'de> Deserialize<'de> for PrincipleCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The analysis service tags free-form categories as `{"Other": "<label>"}`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Label(String),
            Tagged {
                #[serde(rename = "Other")]
                _label: String,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Label(label) => Ok(Self::from_label(&label)),
            Repr::Tagged { .. } => Ok(PrincipleCategory::Other),
        }
    }
}
