//! Diesel schema for registry persistence.

diesel::table! {
    /// Global catalog of upstream MCP servers.
    catalog_servers (id) {
        /// Internal server identifier.
        id -> Uuid,
        /// Unique server name used as the tool-name prefix.
        #[max_length = 255]
        name -> Varchar,
        /// Upstream endpoint URL.
        url -> Text,
        /// Operator-facing description.
        description -> Text,
        /// Last discovered capabilities document.
        capabilities -> Nullable<Jsonb>,
        /// Transport label.
        #[max_length = 64]
        transport -> Varchar,
        /// Access type (`public`, `private`).
        #[max_length = 16]
        access_type -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tenant bindings to catalog servers.
    hub_servers (id) {
        /// Internal binding identifier.
        id -> Uuid,
        /// Owning tenant.
        #[max_length = 255]
        user_id -> Varchar,
        /// Bound catalog server.
        catalog_server_id -> Uuid,
        /// Binding status (`ACTIVE`, `DEACTIVATED`, `UNREACHABLE`).
        #[max_length = 32]
        status -> Varchar,
        /// Credential kind (`none`, `bearer`, `custom_headers`).
        #[max_length = 32]
        auth_type -> Varchar,
        /// Credential document, encrypted when a vault is configured.
        auth_value -> Nullable<Jsonb>,
        /// Capabilities observed through this binding.
        capabilities -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Materialized tools discovered from upstream servers.
    tools (id) {
        /// Internal tool identifier.
        id -> Uuid,
        /// Owning tenant; `NULL` for globally shared tools.
        #[max_length = 255]
        user_id -> Nullable<Varchar>,
        /// Catalog server the tool was discovered on.
        catalog_server_id -> Uuid,
        /// Discovering hub binding; `NULL` for globally shared tools.
        hub_server_id -> Nullable<Uuid>,
        /// Name reported by the upstream.
        original_name -> Text,
        /// Gateway-unique name within the owner scope.
        modified_name -> Text,
        /// Upstream description.
        description -> Text,
        /// Input JSON Schema.
        input_schema -> Jsonb,
        /// Upstream annotations.
        annotations -> Jsonb,
        /// Record status (`ACTIVE`, `DEACTIVATED`).
        #[max_length = 32]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tenant-composed virtual servers.
    virtual_servers (id) {
        /// Internal virtual server identifier.
        id -> Uuid,
        /// Owning tenant.
        #[max_length = 255]
        user_id -> Varchar,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Record status (`ACTIVE`, `DEACTIVATED`).
        #[max_length = 32]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ordered tool attachments of virtual servers.
    tool_virtual_servers (virtual_server_id, tool_id) {
        /// Virtual server side of the attachment.
        virtual_server_id -> Uuid,
        /// Tool side of the attachment.
        tool_id -> Uuid,
        /// Zero-based attachment order.
        position -> Int4,
    }
}

diesel::joinable!(hub_servers -> catalog_servers (catalog_server_id));
diesel::joinable!(tools -> catalog_servers (catalog_server_id));
diesel::joinable!(tool_virtual_servers -> tools (tool_id));
diesel::joinable!(tool_virtual_servers -> virtual_servers (virtual_server_id));

diesel::allow_tables_to_appear_in_same_query!(
    catalog_servers,
    hub_servers,
    tools,
    virtual_servers,
    tool_virtual_servers,
);
