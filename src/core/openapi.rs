use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::exports::{dtos as exports_dtos, handlers as exports_handlers};
use crate::features::mail::{dtos as mail_dtos, handlers as mail_handlers};
use crate::features::members::{
    dtos as members_dtos, handlers as members_handlers, models as members_models,
};
use crate::features::photos::{dtos as photos_dtos, handlers as photos_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{
    dtos as users_dtos, handlers as users_handlers, models as users_models,
};
use crate::shared::constants::SESSION_COOKIE;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::setup_status,
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Users (admin)
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::update_user_role,
        users_handlers::delete_user,
        // Reports
        reports_handlers::form_options,
        reports_handlers::submit_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        // Mail (admin)
        mail_handlers::get_reply_draft,
        mail_handlers::send_reply,
        // Members (editor)
        members_handlers::list_members,
        members_handlers::get_member,
        members_handlers::create_member,
        members_handlers::update_member,
        members_handlers::delete_member,
        members_handlers::import_roster,
        // Exports (admin)
        exports_handlers::get_stats,
        exports_handlers::export_reports,
        // Photos (admin)
        photos_handlers::get_cleanup_overview,
        photos_handlers::execute_cleanup,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::SetupStatusDto,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::LoginResponseDto,
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::LoginResponseDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            // Users
            users_models::Role,
            users_dtos::UserResponseDto,
            users_dtos::UserSummaryDto,
            users_dtos::RoleStatsDto,
            users_dtos::UserListResponseDto,
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserRoleDto,
            users_dtos::DeleteUserResponseDto,
            ApiResponse<users_dtos::UserListResponseDto>,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<users_dtos::DeleteUserResponseDto>,
            // Reports
            reports_models::AnimalSex,
            reports_dtos::SexOptionDto,
            reports_dtos::FormOptionsDto,
            reports_dtos::SubmitReportDoc,
            reports_dtos::SubmitReportResponseDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportDetailResponseDto,
            ApiResponse<reports_dtos::FormOptionsDto>,
            ApiResponse<reports_dtos::SubmitReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::ReportDetailResponseDto>,
            // Mail
            mail_dtos::ReplyDraftDto,
            mail_dtos::SendReplyDto,
            mail_dtos::SendReplyResponseDto,
            ApiResponse<mail_dtos::ReplyDraftDto>,
            ApiResponse<mail_dtos::SendReplyResponseDto>,
            // Members
            members_models::MemberStatus,
            members_models::MemberLicence,
            members_dtos::MemberResponseDto,
            members_dtos::MemberInputDto,
            members_dtos::ImportRosterResponseDto,
            ApiResponse<Vec<members_dtos::MemberResponseDto>>,
            ApiResponse<members_dtos::MemberResponseDto>,
            ApiResponse<members_dtos::ImportRosterResponseDto>,
            // Exports
            exports_dtos::ExportStatsDto,
            ApiResponse<exports_dtos::ExportStatsDto>,
            // Photos
            photos_dtos::DeletedPhotoDirDto,
            photos_dtos::CleanupResultDto,
            photos_dtos::PendingPhotoDirDto,
            photos_dtos::CleanupOverviewDto,
            ApiResponse<photos_dtos::CleanupResultDto>,
            ApiResponse<photos_dtos::CleanupOverviewDto>,
        )
    ),
    tags(
        (name = "auth", description = "Sign-up, sign-in and the current session"),
        (name = "users", description = "Account administration (admin only)"),
        (name = "reports", description = "Hunting activity reports"),
        (name = "mail", description = "Replies to report submitters (admin only)"),
        (name = "members", description = "Association member roster (editor or admin)"),
        (name = "exports", description = "CSV export and statistics (admin only)"),
        (name = "photos", description = "Photo retention (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Huntlog API",
        version = "0.1.0",
        description = "Hunting activity reports for a hunters' association",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
