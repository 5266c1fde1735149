diesel::table! {
    cve_information (cve_id) {
        cve_id -> Int8,
        cve_name -> Text,
        identifier -> Nullable<Text>,
        published_date -> Nullable<Date>,
        last_modified_date -> Nullable<Date>,
        status -> Nullable<Text>,
    }
}

diesel::table! {
    cve_description (cve_id) {
        cve_id -> Int8,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    cvss_v2_metrics (cve_id) {
        cve_id -> Int8,
        severity -> Nullable<Text>,
        score -> Nullable<Float8>,
        vector_string -> Nullable<Text>,
        exploitability_score -> Nullable<Float8>,
        impact_score -> Nullable<Float8>,
    }
}

diesel::table! {
    cvss_data (cve_id) {
        cve_id -> Int8,
        access_vector -> Nullable<Text>,
        access_complexity -> Nullable<Text>,
        authentication -> Nullable<Text>,
        confidentiality_impact -> Nullable<Text>,
        integrity_impact -> Nullable<Text>,
        availability_impact -> Nullable<Text>,
    }
}

diesel::table! {
    configurations (id) {
        id -> Int4,
        cve_id -> Int8,
        vulnerable -> Nullable<Bool>,
        criteria -> Nullable<Text>,
        match_criteria_id -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    cve_information,
    cve_description,
    cvss_v2_metrics,
    cvss_data,
    configurations,
);
