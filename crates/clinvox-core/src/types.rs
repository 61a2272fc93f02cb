use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// The kind of orderable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Lab,
    Imaging,
    Medication,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Lab => write!(f, "lab"),
            OrderType::Imaging => write!(f, "imaging"),
            OrderType::Medication => write!(f, "medication"),
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "lab" => Ok(OrderType::Lab),
            "imaging" => Ok(OrderType::Imaging),
            "medication" => Ok(OrderType::Medication),
            _ => Err(format!("Unknown order type: {}", s)),
        }
    }
}

/// Lifecycle states of an order.
///
/// An order is immutable once it reaches `Confirmed` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// Categories of safety findings attached to a candidate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    Allergy,
    DrugInteraction,
    DuplicateOrder,
    Contraindication,
}

impl fmt::Display for WarningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningType::Allergy => write!(f, "allergy"),
            WarningType::DrugInteraction => write!(f, "drug_interaction"),
            WarningType::DuplicateOrder => write!(f, "duplicate_order"),
            WarningType::Contraindication => write!(f, "contraindication"),
        }
    }
}

impl std::str::FromStr for WarningType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "allergy" => Ok(WarningType::Allergy),
            "drug_interaction" => Ok(WarningType::DrugInteraction),
            "duplicate_order" => Ok(WarningType::DuplicateOrder),
            "contraindication" => Ok(WarningType::Contraindication),
            _ => Err(format!("Unknown warning type: {}", s)),
        }
    }
}

/// Severity of a safety warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "moderate" => Ok(Severity::Moderate),
            "high" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Laterality of an imaging study, parsed from the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Laterality {
    Left,
    Right,
    Bilateral,
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Laterality::Left => write!(f, "left"),
            Laterality::Right => write!(f, "right"),
            Laterality::Bilateral => write!(f, "bilateral"),
        }
    }
}

// =============================================================================
// Domain structs
// =============================================================================

/// A safety finding attached to a candidate order at evaluation time.
///
/// Warnings are created by the safety rule engine and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyWarning {
    pub warning_type: WarningType,
    pub severity: Severity,
    pub message: String,
    pub details: Option<String>,
}

impl SafetyWarning {
    pub fn new(warning_type: WarningType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            warning_type,
            severity,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// A single clinical order.
///
/// Created by the order parser with status `Pending`, annotated with
/// warnings by the safety rule engine, and transitioned to `Confirmed`
/// or `Cancelled` by the confirmation flow. Type-specific fields are
/// `None` when they do not apply to the order type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_type: OrderType,
    /// Canonical catalog name, used for duplicate detection.
    pub canonical_name: String,
    /// Human-readable name spoken back and written to the plan section.
    pub display_name: String,
    /// Free-text details (coding identifier, dose summary, hints).
    pub details: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub warnings: Vec<SafetyWarning>,
    pub requires_confirmation: bool,
    // Medication fields
    pub dose: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub route: Option<String>,
    pub prn: bool,
    // Imaging fields
    pub contrast: Option<bool>,
    pub body_part: Option<String>,
    pub laterality: Option<Laterality>,
}

impl Order {
    /// Create a bare pending order of the given type.
    pub fn new(
        order_type: OrderType,
        canonical_name: impl Into<String>,
        display_name: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_type,
            canonical_name: canonical_name.into(),
            display_name: display_name.into(),
            details: details.into(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            warnings: Vec::new(),
            requires_confirmation: false,
            dose: None,
            frequency: None,
            duration: None,
            route: None,
            prn: false,
            contrast: None,
            body_part: None,
            laterality: None,
        }
    }

    /// Highest severity among attached warnings, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.warnings.iter().map(|w| w.severity).max()
    }
}

/// Read-only view of the active patient used by the safety rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    pub patient_id: String,
    /// Recorded allergy strings, as charted (free text).
    pub allergies: Vec<String>,
    /// Current medication strings, as charted (free text).
    pub current_medications: Vec<String>,
}

impl PatientContext {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            allergies: Vec::new(),
            current_medications: Vec::new(),
        }
    }
}

// =============================================================================
// Persistence contract
// =============================================================================

/// On-disk representation of the order queue: the patient it was saved
/// under plus the confirmed orders, serialized as one JSON document under
/// a single named key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedQueue {
    pub patient_id: String,
    pub orders: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Enum Display / FromStr ----

    #[test]
    fn test_order_type_display_from_str_round_trip() {
        for variant in [OrderType::Lab, OrderType::Imaging, OrderType::Medication] {
            let s = variant.to_string();
            let parsed: OrderType = s.parse().unwrap();
            assert_eq!(variant, parsed);
        }
        assert!("procedure".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_order_status_display_from_str_round_trip() {
        for variant in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Cancelled,
        ] {
            let s = variant.to_string();
            let parsed: OrderStatus = s.parse().unwrap();
            assert_eq!(variant, parsed);
        }
        assert!("held".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_warning_type_display_from_str_round_trip() {
        for variant in [
            WarningType::Allergy,
            WarningType::DrugInteraction,
            WarningType::DuplicateOrder,
            WarningType::Contraindication,
        ] {
            let s = variant.to_string();
            let parsed: WarningType = s.parse().unwrap();
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Moderate);
        assert!(Severity::Moderate > Severity::Low);
    }

    #[test]
    fn test_enum_serde_json_format() {
        assert_eq!(
            serde_json::to_string(&WarningType::DrugInteraction).unwrap(),
            "\"drug_interaction\""
        );
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
        assert_eq!(
            serde_json::to_string(&Laterality::Bilateral).unwrap(),
            "\"bilateral\""
        );
    }

    // ---- SafetyWarning ----

    #[test]
    fn test_safety_warning_builder() {
        let w = SafetyWarning::new(WarningType::Allergy, Severity::High, "Allergy to penicillin")
            .with_details("Cross-reactive classes: penicillin, ampicillin");
        assert_eq!(w.warning_type, WarningType::Allergy);
        assert_eq!(w.severity, Severity::High);
        assert!(w.details.unwrap().contains("ampicillin"));
    }

    // ---- Order ----

    #[test]
    fn test_new_order_is_pending_without_warnings() {
        let order = Order::new(OrderType::Lab, "cbc", "Complete Blood Count", "LOINC 58410-2");
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.warnings.is_empty());
        assert!(!order.requires_confirmation);
        assert!(order.dose.is_none());
        assert!(order.contrast.is_none());
        assert!(!order.prn);
    }

    #[test]
    fn test_order_max_severity() {
        let mut order = Order::new(OrderType::Medication, "ibuprofen", "Ibuprofen", "");
        assert_eq!(order.max_severity(), None);

        order.warnings.push(SafetyWarning::new(
            WarningType::DuplicateOrder,
            Severity::Moderate,
            "duplicate",
        ));
        order.warnings.push(SafetyWarning::new(
            WarningType::Allergy,
            Severity::High,
            "allergy",
        ));
        assert_eq!(order.max_severity(), Some(Severity::High));
    }

    #[test]
    fn test_order_serde_round_trip_with_nested_warnings() {
        let mut order = Order::new(OrderType::Imaging, "ct_chest", "CT Chest", "CPT 71260");
        order.contrast = Some(true);
        order.laterality = Some(Laterality::Left);
        order.warnings.push(
            SafetyWarning::new(
                WarningType::Contraindication,
                Severity::High,
                "Patient on metformin",
            )
            .with_details("Hold metformin 48 hours around the contrast study"),
        );
        order.requires_confirmation = true;

        let json = serde_json::to_string(&order).unwrap();
        let rt: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(rt.id, order.id);
        assert_eq!(rt.order_type, OrderType::Imaging);
        assert_eq!(rt.contrast, Some(true));
        assert_eq!(rt.laterality, Some(Laterality::Left));
        assert_eq!(rt.warnings.len(), 1);
        assert_eq!(rt.warnings[0].severity, Severity::High);
        assert!(rt.requires_confirmation);
    }

    // ---- PersistedQueue ----

    #[test]
    fn test_persisted_queue_serde_round_trip() {
        let queue = PersistedQueue {
            patient_id: "patient-001".to_string(),
            orders: vec![
                Order::new(OrderType::Lab, "cbc", "Complete Blood Count", ""),
                Order::new(OrderType::Lab, "bmp", "Basic Metabolic Panel", ""),
            ],
        };
        let json = serde_json::to_string(&queue).unwrap();
        let rt: PersistedQueue = serde_json::from_str(&json).unwrap();
        assert_eq!(rt.patient_id, "patient-001");
        assert_eq!(rt.orders.len(), 2);
        assert_eq!(rt.orders[0].canonical_name, "cbc");
    }

    // ---- PatientContext ----

    #[test]
    fn test_patient_context_starts_empty() {
        let patient = PatientContext::new("patient-007");
        assert_eq!(patient.patient_id, "patient-007");
        assert!(patient.allergies.is_empty());
        assert!(patient.current_medications.is_empty());
    }
}
