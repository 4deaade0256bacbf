// Keep in sync with migrations/.

diesel::table! {
    dive (id) {
        id -> Uuid,
        user_id -> Text,
        dive_number -> Int4,
        dive_date -> Timestamptz,
        location -> Text,
        duration -> Float8,
        max_depth -> Float8,
        water_type -> Text,
        mode -> Text,
        club_name -> Text,
        instructor_name -> Text,
        photo_storage_id -> Text,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        osm_link -> Nullable<Text>,
        site -> Nullable<Text>,
        water_temperature -> Nullable<Float8>,
        visibility -> Nullable<Float8>,
        weather -> Nullable<Text>,
        suit_thickness -> Nullable<Float8>,
        lead_weights -> Nullable<Float8>,
        club_website -> Nullable<Text>,
        notes -> Nullable<Text>,
        buddy_ids -> Array<Text>,
        equipment -> Array<Text>,
        buddy_check -> Bool,
        briefed -> Bool,
        logged_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
