// Diesel table definitions. Kept in sync with `DbContext::init_schema`.

diesel::table! {
    airlines (id) {
        id -> Text,
        name -> Text,
        base_url -> Text,
        logo_url -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    keywords (id) {
        id -> Text,
        airline_id -> Nullable<Text>,
        keyword -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    monitor_urls (id) {
        id -> Text,
        airline_id -> Text,
        url -> Text,
        last_html_hash -> Nullable<Text>,
        last_checked_at -> Nullable<Text>,
        list_link_selector -> Nullable<Text>,
        detail_title_selector -> Nullable<Text>,
        list_period_selector -> Nullable<Text>,
        list_next_selector -> Nullable<Text>,
    }
}

diesel::table! {
    notices (id) {
        id -> Text,
        airline_id -> Text,
        source_url -> Text,
        content_type -> Text,
        raw_content -> Text,
        extracted_text -> Nullable<Text>,
        event_start -> Nullable<Text>,
        event_end -> Nullable<Text>,
        routes -> Nullable<Text>,
        is_special_deal -> Bool,
        created_at -> Text,
        analyzed_at -> Nullable<Text>,
    }
}

diesel::table! {
    deals (id) {
        id -> Text,
        notice_id -> Nullable<Text>,
        airline_id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        url -> Nullable<Text>,
        event_start -> Nullable<Text>,
        event_end -> Nullable<Text>,
        routes -> Nullable<Text>,
        price -> Nullable<BigInt>,
        image_url -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    run_locks (name) {
        name -> Text,
        holder -> Text,
        acquired_at -> Text,
        expires_at -> Text,
    }
}

diesel::joinable!(monitor_urls -> airlines (airline_id));
diesel::joinable!(notices -> airlines (airline_id));

diesel::allow_tables_to_appear_in_same_query!(
    airlines,
    keywords,
    monitor_urls,
    notices,
    deals,
    run_locks,
);
