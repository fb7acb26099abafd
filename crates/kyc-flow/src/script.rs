//! Everything the flow says or shows

use crate::state_machine::PermissionKind;
use kyc_core::DocumentKind;

pub const AADHAAR_CAPTURED: &str = "Aadhaar card captured. Now please show your PAN card.";
pub const PAN_CAPTURED: &str = "PAN card captured. Now please align your face for verification.";
pub const COMPARING: &str = "Comparing your face with your documents.";
pub const COMPARING_HEADING: &str = "Comparing your face with your documents...";
pub const FACE_MISMATCH: &str =
    "Face does not match the Aadhaar photo. Please capture your Aadhaar card again.";
pub const FACE_MATCHED: &str = "Face matched. Processing your information...";
pub const REVIEW_PROMPT: &str =
    "Please review your details. You can modify them if needed, then click Confirm.";
pub const REVIEW_HEADING: &str = "Review and Confirm Your Details";
pub const LEGAL_HEADING: &str = "Final Confirmation";
pub const RECORDING_HEADING: &str = "Recording... Please read the statement aloud";

pub const PROCESSING_ERROR: &str = "Error processing your details. Please try again.";
pub const FETCH_ERROR: &str = "Error fetching details. Please try again.";
pub const CAMERA_DENIED: &str = "Camera access denied. Please enable camera to continue.";
pub const RECORDING_UNAVAILABLE: &str =
    "Screen/audio recording permission denied or not supported.";
pub const CAPTURE_RETRY: &str = "Could not capture the image. Please try again.";

/// Prompt for a permission step
pub fn permission_prompt(kind: PermissionKind) -> &'static str {
    match kind {
        PermissionKind::Microphone => {
            "Please allow microphone access to continue your KYC process."
        }
        PermissionKind::Audio => "Please allow audio access to continue your KYC process.",
        PermissionKind::Location => "Please allow location access to continue your KYC process.",
    }
}

/// Prompt for a capture step
pub fn capture_prompt(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Aadhaar => "Please show your Aadhaar card to the camera and click Capture.",
        DocumentKind::Pan => "Now, please show your PAN card to the camera and click Capture.",
        DocumentKind::Face => "Now, please align your face in the camera and click Capture Face.",
    }
}

/// The attestation the user reads aloud on camera
pub fn legal_statement(name: Option<&str>, lender: &str) -> String {
    let greeting = match name {
        Some(name) => format!("{}, please", name),
        None => "Please".to_string(),
    };
    format!(
        "{} read the following statement on camera: I confirm that the information given is correct and with my own will, I am interested in an {} loan.",
        greeting, lender
    )
}

pub fn thank_you(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Thank you, {}! Your KYC is completed.", name),
        None => "Thank you! Your KYC is completed.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_statement_personalized() {
        let text = legal_statement(Some("Asha Rao"), "HDFC");
        assert!(text.starts_with("Asha Rao, please read the following statement"));
        assert!(text.ends_with("I am interested in an HDFC loan."));
    }

    #[test]
    fn test_legal_statement_without_name() {
        assert!(legal_statement(None, "HDFC").starts_with("Please read the following"));
    }

    #[test]
    fn test_thank_you() {
        assert_eq!(
            thank_you(Some("Asha Rao")),
            "Thank you, Asha Rao! Your KYC is completed."
        );
        assert_eq!(thank_you(None), "Thank you! Your KYC is completed.");
    }
}
