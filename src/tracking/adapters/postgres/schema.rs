//! Diesel schema for tracking persistence.

diesel::table! {
    /// Tracked task intervals with their category snapshot.
    tracked_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Trimmed task description.
        description -> Text,
        /// Snapshot of the category identifier.
        category_id -> Nullable<Uuid>,
        /// Snapshot of the category name.
        #[max_length = 100]
        category_name -> Nullable<Varchar>,
        /// Snapshot of the category colour.
        #[max_length = 7]
        category_color -> Nullable<Varchar>,
        /// Start instant.
        start_time -> Timestamptz,
        /// End instant; null while the task runs.
        end_time -> Nullable<Timestamptz>,
        /// Duration in hundredths of a minute; null while the task runs.
        duration_centiminutes -> Nullable<Int8>,
    }
}

diesel::table! {
    /// User-defined categories.
    categories (id) {
        /// Category identifier.
        id -> Uuid,
        /// Display name, unique ignoring case.
        #[max_length = 100]
        name -> Varchar,
        /// `#RRGGBB` colour.
        #[max_length = 7]
        color -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Preset task labels.
    quick_buttons (id) {
        /// Button identifier.
        id -> Uuid,
        /// Task description started by the button.
        label -> Text,
        /// Linked category, cleared when the category is deleted.
        category_id -> Nullable<Uuid>,
        /// Display position.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tracked_tasks, categories, quick_buttons);
