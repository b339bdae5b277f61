use serde_json::{json, Value};

use quote_join_model::{
    AgeUnit, CombinedCode, ExtrasCode, FixedClock, Frequency, Gender, HospitalCode, KnownPath,
    ModelOptions, ProductCatalog, QuoteModel, Scale,
};

fn catalog_json() -> Value {
    json!({
        "Core": {"Code": "Bundles", "BaseBundle": "Core", "Bundles": []},
        "CorePlus": {"Code": "Bundles", "BaseBundle": "CorePlus", "Bundles": []},
        "Top": {"Code": "Top", "BaseBundle": "Top", "Bundles": []},
        "Wellbeing": {"Code": "Bundles", "BaseBundle": "Core", "Bundles": ["Wellbeing"]}
    })
}

fn model_with_catalog() -> QuoteModel {
    QuoteModel::from_json(&json!({ "preBundledExtrasProducts": catalog_json() })).unwrap()
}

#[test]
fn empty_bundles_build_empty_models() {
    assert!(QuoteModel::new(ModelOptions::new()).unwrap().attributes().is_empty());
    assert!(QuoteModel::from_json(&json!({})).unwrap().attributes().is_empty());

    let seeded = QuoteModel::from_json(&json!({"attributes": {"name": "John Smith"}})).unwrap();
    assert_eq!(Value::Object(seeded.attributes().clone()), json!({"name": "John Smith"}));
}

#[test]
fn policy_holder_age_floors_to_completed_months() {
    let clock = FixedClock::on_date(2014, 4, 1).unwrap();
    let mut model = QuoteModel::new(ModelOptions::new().clock(clock)).unwrap();
    model.set("PersonalDetails.PolicyHolder.DateOfBirth", "1995-09-01").unwrap();
    assert_eq!(model.policy_holder_age().unwrap(), Some(18));
    assert_eq!(model.policy_holder_age_in(AgeUnit::Months).unwrap(), Some(223));

    let clock = FixedClock::on_date(2014, 11, 1).unwrap();
    let mut model = QuoteModel::new(ModelOptions::new().clock(clock)).unwrap();
    model.set("PersonalDetails.PolicyHolder.DateOfBirth", "1995-09-01").unwrap();
    assert_eq!(model.policy_holder_age().unwrap(), Some(19));
}

#[test]
fn lhc_applied_only_for_positive_loading() {
    for loading in [1, 2, 99] {
        let model = QuoteModel::from_json(&json!({"lhc": {"Loading": loading}})).unwrap();
        assert!(model.is_lhc_applied().unwrap(), "loading {loading}");
    }
    for loading in [-1, 0] {
        let model = QuoteModel::from_json(&json!({"lhc": {"Loading": loading}})).unwrap();
        assert!(!model.is_lhc_applied().unwrap(), "loading {loading}");
    }
}

#[test]
fn gender_from_title_table() {
    assert_eq!(QuoteModel::gender_from_title("Mr"), Some(Gender::Male));
    for title in ["Mrs", "Miss", "Ms"] {
        assert_eq!(QuoteModel::gender_from_title(title), Some(Gender::Female), "{title}");
    }
    assert_eq!(QuoteModel::gender_from_title("Dr"), None);
}

#[test]
fn title_defaults_gender() {
    let mut model = QuoteModel::default();
    model.set("PersonalDetails.PolicyHolder.Title", "Mr").unwrap();
    assert_eq!(model.get("PersonalDetails.PolicyHolder.Gender"), Some(&json!("Male")));

    let mut model = QuoteModel::default();
    model.set("PersonalDetails.PolicyHolder.Title", "Mrs").unwrap();
    assert_eq!(model.get("PersonalDetails.PolicyHolder.Gender"), Some(&json!("Female")));
}

#[test]
fn unmapped_title_leaves_gender_alone() {
    let mut model = QuoteModel::default();
    model.set("PersonalDetails.PolicyHolder.Title", "Dr").unwrap();
    assert!(model.get("PersonalDetails.PolicyHolder.Gender").is_none());

    let mut model = QuoteModel::default();
    model.set("PersonalDetails.PolicyHolder.Gender", "Male").unwrap();
    model.set("PersonalDetails.PolicyHolder.Title", "Dr").unwrap();
    assert_eq!(model.get("PersonalDetails.PolicyHolder.Gender"), Some(&json!("Male")));
}

#[test]
fn partner_title_defaults_partner_gender_only() {
    let mut model = QuoteModel::default();
    model.set_partner_title("Ms").unwrap();
    assert_eq!(model.partner_gender(), Some(Gender::Female));
    assert_eq!(model.policy_holder_gender(), None);
}

#[test]
fn hospital_product_code_round_trip() {
    let mut model = model_with_catalog();
    assert_eq!(model.hospital_product_code(), None);
    model.set(KnownPath::HospitalCode, "BASIC").unwrap();
    assert_eq!(model.hospital_product_code(), Some(HospitalCode::Basic));
    assert!(model.is_hospital_product_selected());

    model.set_hospital_product_code(HospitalCode::None).unwrap();
    assert!(!model.is_hospital_product_selected());
}

#[test]
fn extras_product_code_reverse_lookup() {
    let mut model = model_with_catalog();
    assert_eq!(model.extras_product_code(), None);

    model
        .set("ProductSelection.Extras", json!({"Code": "Bundles", "BaseBundle": "CorePlus", "Bundles": []}))
        .unwrap();
    assert_eq!(model.extras_product_code(), Some(ExtrasCode::CorePlus.as_ref()));

    model
        .set("ProductSelection.Extras", json!({"Code": "Top", "BaseBundle": "Top", "Bundles": []}))
        .unwrap();
    assert_eq!(model.extras_product_code(), Some("Top"));
}

#[test]
fn extras_selection_states() {
    let mut model = model_with_catalog();
    model.set_extras_product_code(ExtrasCode::Core).unwrap();
    assert!(model.is_extras_product_selected());

    model.set_extras_product_code(ExtrasCode::None).unwrap();
    assert!(!model.is_extras_product_selected());

    model.set("ProductSelection.Extras", Value::Null).unwrap();
    assert!(!model.is_extras_product_selected());
}

#[test]
fn extras_none_is_canonical_even_when_catalog_lists_it() {
    let mut catalog = catalog_json();
    catalog["None"] = json!({"Code": "None", "BaseBundle": "Core", "Bundles": ["Wellbeing"]});
    let mut model = QuoteModel::from_json(&json!({ "preBundledExtrasProducts": catalog })).unwrap();

    model.set_extras_product_code("Top").unwrap();
    model.set_extras_product_code(ExtrasCode::None).unwrap();
    assert_eq!(
        model.get("ProductSelection.Extras"),
        Some(&json!({"Code": "None", "BaseBundle": null, "Bundles": []}))
    );
    assert_eq!(model.extras_product_code(), Some("None"));
    assert!(!model.is_extras_product_selected());
}

#[test]
fn combined_selection_states() {
    let mut model = model_with_catalog();
    model.set_combined_product_code(CombinedCode::Kickstarter).unwrap();
    assert!(model.is_combined_product_selected());

    let mut model = model_with_catalog();
    model.set_extras_product_code("None").unwrap();
    assert!(!model.is_combined_product_selected());

    model.set("ProductSelection.Combined", Value::Null).unwrap();
    assert!(!model.is_combined_product_selected());
}

#[test]
fn hospital_component_from_hospital_or_combined() {
    let mut model = model_with_catalog();
    model.set_hospital_product_code(HospitalCode::Basic).unwrap();
    assert!(model.has_hospital_component());

    let mut model = model_with_catalog();
    model.set_combined_product_code(CombinedCode::Kickstarter).unwrap();
    assert!(model.has_hospital_component());

    let mut model = model_with_catalog();
    model.set_hospital_product_code(HospitalCode::None).unwrap();
    assert!(!model.has_hospital_component());
    model.set_combined_product_code(CombinedCode::Kickstarter).unwrap();
    assert!(model.has_hospital_component());
}

#[test]
fn full_quote_flow() {
    let clock = FixedClock::on_date(2024, 7, 1).unwrap();
    let bundle = json!({
        "agr": {"Tiers": [
            {"Code": "0", "Bands": [
                {"MinAge": 0, "Percentage": 24.608},
                {"MinAge": 65, "Percentage": 28.710},
                {"MinAge": 70, "Percentage": 32.812}
            ]},
            {"Code": "3", "Bands": [{"MinAge": 0, "Percentage": 0.0}]}
        ]},
        "lhc": {"Loading": 0},
        "preBundledExtrasProducts": catalog_json()
    });
    let options = ModelOptions::from_json(&bundle).unwrap().clock(clock);
    let mut model = QuoteModel::new(options).unwrap();

    model
        .set_scale(Scale::Couple)
        .unwrap()
        .set_state("VIC")
        .unwrap()
        .set_policy_holder_title("Mr")
        .unwrap()
        .set_partner_title("Mrs")
        .unwrap()
        .set("PersonalDetails.PolicyHolder.DateOfBirth", "1950-01-15")
        .unwrap()
        .set("PersonalDetails.Partner.DateOfBirth", "1960-03-02")
        .unwrap()
        .set_income_tier("0")
        .unwrap()
        .set_agr_applied(true)
        .unwrap()
        .set_frequency(Frequency::Monthly)
        .unwrap()
        .set_hospital_product_code(HospitalCode::Mid)
        .unwrap()
        .set_excess("500")
        .unwrap()
        .set_extras_product_code("Wellbeing")
        .unwrap();

    assert!(model.is_couple());
    assert_eq!(model.policy_holder_gender(), Some(Gender::Male));
    assert_eq!(model.partner_gender(), Some(Gender::Female));
    assert_eq!(model.policy_holder_age().unwrap(), Some(74));
    assert_eq!(model.partner_age().unwrap(), Some(64));
    assert!((model.agr_percentage().unwrap() - 32.812).abs() < 1e-9);
    assert!(model.is_agr_applied());
    assert!(!model.is_lhc_applied().unwrap());
    assert_eq!(model.excess(), Some(500.0));
    assert_eq!(model.extras_product_code(), Some("Wellbeing"));
    assert!(model.has_hospital_component());

    model.set_income_tier("3").unwrap();
    assert!(model.agr_percentage().unwrap().abs() < f64::EPSILON);
}

#[test]
fn catalog_from_json_matches_builder() {
    let catalog = ProductCatalog::from_json(&catalog_json()).unwrap();
    assert_eq!(catalog.len(), 4);
    assert_eq!(
        catalog.code_for(&json!({"Code": "Bundles", "BaseBundle": "Core", "Bundles": ["Wellbeing"]})),
        Some("Wellbeing")
    );
}
