//! Field-level request validation.
//!
//! Only two payloads carry validation rules: patients (required fields,
//! sex code, CNP length) and clinics (required fields). Everything else
//! is passed through and left to database constraints.

use medtrial_api::ApiError;
use medtrial_db::clinics::ClinicInput;
use medtrial_db::patients::PatientInput;

/// A field counts as present when it is set and not blank after trimming.
fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

pub fn validate_patient(input: &PatientInput) -> Result<(), ApiError> {
    let required = [
        &input.nume,
        &input.prenume,
        &input.sex,
        &input.data_nasterii,
        &input.cnp,
        &input.nr_telefon,
    ];
    if required.into_iter().any(|f| !present(f)) {
        return Err(ApiError::bad_request(
            "Toate câmpurile obligatorii trebuie completate.",
        ));
    }

    match input.sex.as_deref() {
        Some("M") | Some("F") => {}
        _ => {
            return Err(ApiError::bad_request("Sexul trebuie să fie 'M' sau 'F'."));
        }
    }

    // Character count, not bytes; CNP digits are ASCII but the message
    // talks about characters.
    let cnp_len = input.cnp.as_deref().map_or(0, |c| c.chars().count());
    if cnp_len != 13 {
        return Err(ApiError::bad_request(
            "CNP-ul trebuie să conțină exact 13 caractere.",
        ));
    }

    Ok(())
}

pub fn validate_clinic(input: &ClinicInput) -> Result<(), ApiError> {
    let required = [&input.nume_cabinet, &input.locatie, &input.capacitate];
    if required.into_iter().any(|f| !present(f)) {
        return Err(ApiError::bad_request("Toate câmpurile sunt obligatorii"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_patient() -> PatientInput {
        serde_json::from_str(
            r#"{
                "Nume": "Popescu",
                "Prenume": "Ion",
                "Sex": "M",
                "DataNasterii": "1990-04-12",
                "CNP": "1900412123456",
                "NrTelefon": "0722000000"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn accepts_complete_patient() {
        assert!(validate_patient(&valid_patient()).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut input = valid_patient();
        input.nr_telefon = None;
        let err = validate_patient(&input).unwrap_err();
        assert_eq!(err.message(), "Toate câmpurile obligatorii trebuie completate.");
    }

    #[test]
    fn rejects_blank_required_field() {
        let mut input = valid_patient();
        input.prenume = Some("   ".into());
        assert!(validate_patient(&input).is_err());
    }

    #[test]
    fn rejects_invalid_sex_code() {
        let mut input = valid_patient();
        input.sex = Some("X".into());
        let err = validate_patient(&input).unwrap_err();
        assert_eq!(err.message(), "Sexul trebuie să fie 'M' sau 'F'.");
    }

    #[test]
    fn rejects_short_cnp() {
        let mut input = valid_patient();
        input.cnp = Some("12345".into());
        let err = validate_patient(&input).unwrap_err();
        assert_eq!(err.message(), "CNP-ul trebuie să conțină exact 13 caractere.");
    }

    #[test]
    fn cnp_length_counts_characters() {
        let mut input = valid_patient();
        // 13 characters, even though more than 13 bytes
        input.cnp = Some("ăăăăăăăăăăăăă".into());
        assert!(validate_patient(&input).is_ok());
    }

    #[test]
    fn clinic_requires_all_fields() {
        let input: ClinicInput =
            serde_json::from_str(r#"{"NumeCabinet":"Central","Locatie":"Iasi"}"#).unwrap();
        let err = validate_clinic(&input).unwrap_err();
        assert_eq!(err.message(), "Toate câmpurile sunt obligatorii");

        let full: ClinicInput = serde_json::from_str(
            r#"{"NumeCabinet":"Central","Locatie":"Iasi","Capacitate":"40"}"#,
        )
        .unwrap();
        assert!(validate_clinic(&full).is_ok());
    }
}
