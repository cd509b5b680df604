use minijinja::context;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::config::{MailConfig, SenderMode};
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::mail::dtos::{ReplyDraftDto, SendReplyDto, SendReplyResponseDto};
use crate::features::reports::models::Report;
use crate::features::reports::services::ReportService;
use crate::modules::mail::{MailBody, Mailer, OutgoingMail};
use crate::shared::templates::{self, REPLY_BODY, REPORT_NOTIFICATION};
use crate::shared::time;

/// Mail around reports: submission notices and admin replies
pub struct MailService {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
    config: MailConfig,
    reports: Arc<ReportService>,
}

impl MailService {
    pub fn new(
        pool: SqlitePool,
        mailer: Arc<dyn Mailer>,
        config: MailConfig,
        reports: Arc<ReportService>,
    ) -> Self {
        Self {
            pool,
            mailer,
            config,
            reports,
        }
    }

    /// `From:` name and address for mail sent on behalf of `user`
    pub fn sender_for(&self, user: &AuthenticatedUser) -> (Option<String>, String) {
        match self.config.sender_mode {
            SenderMode::User if !user.email.trim().is_empty() => {
                (Some(user.name.clone()), user.email.trim().to_string())
            }
            _ => (None, self.config.default_sender.clone()),
        }
    }

    fn outgoing(
        &self,
        user: &AuthenticatedUser,
        to: &str,
        subject: String,
        body: String,
        kind: MailBody,
    ) -> OutgoingMail {
        let (from_name, from_email) = self.sender_for(user);
        OutgoingMail {
            from_name,
            from_email,
            to: to.to_string(),
            subject,
            body,
            kind,
        }
    }

    /// Tell the municipal contact about a new report.
    ///
    /// Returns whether the mail was delivered. Failures are logged only; a
    /// submission never fails because of mail.
    pub async fn notify_submission(
        &self,
        report: &Report,
        user: &AuthenticatedUser,
        photo_count: usize,
    ) -> bool {
        if !self.mailer.is_enabled() {
            tracing::info!(
                "Mail disabled; skipped notification for {}",
                report.report_number
            );
            return false;
        }

        let body = match templates::render(
            REPORT_NOTIFICATION,
            context! {
                report => report,
                sex_label => report.sex.label(),
                photo_count => photo_count,
                sender_name => &user.name,
            },
        ) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to render notification: {}", e);
                return false;
            }
        };

        let subject = format!(
            "[Hunting report] Activity report - {}",
            report.report_number
        );
        let mail = self.outgoing(
            user,
            &self.config.municipal_contact,
            subject,
            body,
            MailBody::Html,
        );

        match self.mailer.send(mail).await {
            Ok(()) => {
                tracing::info!("Sent notification for {}", report.report_number);
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to send notification for {}: {}",
                    report.report_number,
                    e
                );
                false
            }
        }
    }

    /// Reporter's account address, or `<name>@<fallback domain>` when the
    /// account no longer exists
    async fn recipient_for(&self, report: &Report) -> Result<String> {
        let email: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE name = ?")
            .bind(&report.user_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up reporter: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(match email.filter(|e| !e.trim().is_empty()) {
            Some(email) => email,
            None => {
                let guess = format!("{}@{}", report.user_name, self.config.fallback_domain);
                tracing::info!(
                    "No account for {}; falling back to {}",
                    report.user_name,
                    guess
                );
                guess
            }
        })
    }

    pub async fn reply_draft(
        &self,
        admin: &AuthenticatedUser,
        report_id: i64,
    ) -> Result<ReplyDraftDto> {
        let report = self.reports.get_by_id(report_id).await?;
        let recipient = self.recipient_for(&report).await?;

        let body = templates::render(
            REPLY_BODY,
            context! {
                user_name => &report.user_name,
                report => &report,
                sex_label => report.sex.label(),
                sender_name => &admin.name,
            },
        )?;

        Ok(ReplyDraftDto {
            report_id: report.id,
            subject: format!("Re: Hunting activity report {}", report.report_number),
            report_number: report.report_number,
            recipient,
            body,
            email_sent: report.email_sent,
            mail_enabled: self.mailer.is_enabled(),
        })
    }

    /// Send the admin's reply and record it on the report.
    ///
    /// Refused when a reply already went out or mail is disabled. If the
    /// reply to the reporter fails nothing is recorded. A failed copy to the
    /// municipal contact is logged and reported as `copy_sent = false`.
    pub async fn send_reply(
        &self,
        admin: &AuthenticatedUser,
        report_id: i64,
        dto: SendReplyDto,
    ) -> Result<SendReplyResponseDto> {
        let report = self.reports.get_by_id(report_id).await?;

        if report.email_sent {
            return Err(AppError::Conflict(format!(
                "A mail was already sent for report {}",
                report.report_number
            )));
        }

        if !self.mailer.is_enabled() {
            return Err(AppError::ServiceUnavailable(
                "Mail is not available; contact the system administrator".to_string(),
            ));
        }

        let recipient = self.recipient_for(&report).await?;
        let mail = self.outgoing(
            admin,
            &recipient,
            dto.subject.clone(),
            dto.body.clone(),
            MailBody::Text,
        );

        self.mailer.send(mail).await.map_err(|e| match e {
            AppError::ExternalServiceError(_) | AppError::BadRequest(_) => e,
            other => AppError::ExternalServiceError(format!("Failed to send mail: {}", other)),
        })?;

        let mut copy_sent = false;
        if dto.send_copy {
            let copy = self.outgoing(
                admin,
                &self.config.municipal_contact,
                format!("[Copy] {}", dto.subject),
                format!("The following mail was sent:\n\n{}", dto.body),
                MailBody::Text,
            );
            match self.mailer.send(copy).await {
                Ok(()) => copy_sent = true,
                Err(e) => tracing::warn!(
                    "Reply for {} sent, but the copy failed: {}",
                    report.report_number,
                    e
                ),
            }
        }

        let sent_at = time::now();
        sqlx::query(
            r#"
            UPDATE reports
            SET email_sent = 1, email_sent_at = ?, email_sent_by = ?
            WHERE id = ?
            "#,
        )
        .bind(sent_at)
        .bind(&admin.name)
        .bind(report.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record reply for {}: {:?}", report.report_number, e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "{} replied to {} about report {}",
            admin.name,
            recipient,
            report.report_number
        );

        Ok(SendReplyResponseDto {
            report_number: report.report_number,
            recipient,
            copy_sent,
            email_sent_at: sent_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::test_pool;
    use crate::features::members::MemberService;
    use crate::features::users::models::Role;
    use crate::modules::mail::RecordingMailer;
    use crate::modules::storage::PhotoStore;
    use std::path::PathBuf;

    fn config(sender_mode: SenderMode) -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.org".to_string(),
            smtp_port: 587,
            smtp_username: Some("relay@example.org".to_string()),
            smtp_password: Some("secret".to_string()),
            default_sender: "association@example.org".to_string(),
            municipal_contact: "office@town.example".to_string(),
            sender_mode,
            fallback_domain: "mail.example".to_string(),
        }
    }

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            id: 1,
            name: "Chair".to_string(),
            email: "chair@example.org".to_string(),
            role: Role::Admin,
        }
    }

    async fn service(mailer: Arc<RecordingMailer>, mode: SenderMode) -> (MailService, SqlitePool) {
        let pool = test_pool().await;
        let members = Arc::new(MemberService::new(pool.clone(), PathBuf::from("data")));
        let photos = Arc::new(PhotoStore::new("uploads"));
        let reports = Arc::new(ReportService::new(
            pool.clone(),
            photos,
            members,
            PathBuf::from("data"),
            1,
        ));
        let svc = MailService::new(pool.clone(), mailer, config(mode), reports);
        (svc, pool)
    }

    async fn insert_report(pool: &SqlitePool, user_name: &str) -> Report {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (report_number, user_name, activity_date, start_time, end_time,
                                 method, hunter, location, animal, sex, created_at)
            VALUES ('20240521001', ?, '2024-05-21', '06:00', '09:00', 'Trap', 'Taro Yamada',
                    'North Ridge', 'Wild boar', 'male', '2024-05-21 09:30:00')
            RETURNING {}
            "#,
            crate::features::reports::models::REPORT_COLUMNS
        ))
        .bind(user_name)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn insert_user(pool: &SqlitePool, name: &str, email: &str) {
        sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, created_at) VALUES (?, ?, 'x', 'reporter', '2024-01-01 00:00:00')",
        )
        .bind(name)
        .bind(email)
        .execute(pool)
        .await
        .unwrap();
    }

    fn reply(send_copy: bool) -> SendReplyDto {
        SendReplyDto {
            subject: "Thanks".to_string(),
            body: "Received.".to_string(),
            send_copy,
        }
    }

    #[tokio::test]
    async fn test_sender_mode() {
        let mailer = Arc::new(RecordingMailer::new());
        let (svc, _) = service(mailer.clone(), SenderMode::User).await;
        assert_eq!(
            svc.sender_for(&admin()),
            (Some("Chair".to_string()), "chair@example.org".to_string())
        );

        let mut no_email = admin();
        no_email.email = String::new();
        assert_eq!(
            svc.sender_for(&no_email),
            (None, "association@example.org".to_string())
        );

        let (fixed, _) = service(mailer, SenderMode::Fixed).await;
        assert_eq!(fixed.sender_for(&admin()).1, "association@example.org");
    }

    #[tokio::test]
    async fn test_notify_submission() {
        let mailer = Arc::new(RecordingMailer::new());
        let (svc, pool) = service(mailer.clone(), SenderMode::User).await;
        let report = insert_report(&pool, "Taro").await;

        assert!(svc.notify_submission(&report, &admin(), 2).await);
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "office@town.example");
        assert_eq!(sent[0].subject, "[Hunting report] Activity report - 20240521001");
        assert_eq!(sent[0].kind, MailBody::Html);
        assert!(sent[0].body.contains("Wild boar"));
    }

    #[tokio::test]
    async fn test_notify_reports_failure() {
        for mailer in [RecordingMailer::disabled(), RecordingMailer::failing()] {
            let (svc, pool) = service(Arc::new(mailer), SenderMode::User).await;
            let report = insert_report(&pool, "Taro").await;
            assert!(!svc.notify_submission(&report, &admin(), 1).await);
        }
    }

    #[tokio::test]
    async fn test_reply_draft_recipient() {
        let mailer = Arc::new(RecordingMailer::new());
        let (svc, pool) = service(mailer, SenderMode::User).await;
        let report = insert_report(&pool, "Taro").await;

        let draft = svc.reply_draft(&admin(), report.id).await.unwrap();
        assert_eq!(draft.recipient, "Taro@mail.example");
        assert!(draft.body.starts_with("Dear Taro,"));
        assert!(draft.subject.contains("20240521001"));

        insert_user(&pool, "Taro", "taro@example.org").await;
        let draft = svc.reply_draft(&admin(), report.id).await.unwrap();
        assert_eq!(draft.recipient, "taro@example.org");
    }

    #[tokio::test]
    async fn test_send_reply_records_and_refuses_second_send() {
        let mailer = Arc::new(RecordingMailer::new());
        let (svc, pool) = service(mailer.clone(), SenderMode::User).await;
        insert_user(&pool, "Taro", "taro@example.org").await;
        let report = insert_report(&pool, "Taro").await;

        let result = svc.send_reply(&admin(), report.id, reply(true)).await.unwrap();
        assert!(result.copy_sent);
        assert_eq!(result.recipient, "taro@example.org");

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].subject, "[Copy] Thanks");
        assert_eq!(sent[1].to, "office@town.example");

        let stored = svc.reports.get_by_id(report.id).await.unwrap();
        assert!(stored.email_sent);
        assert_eq!(stored.email_sent_by.as_deref(), Some("Chair"));
        assert!(stored.email_sent_at.is_some());

        assert!(matches!(
            svc.send_reply(&admin(), report.id, reply(false)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_send_reply_disabled_and_failing() {
        let (svc, pool) = service(Arc::new(RecordingMailer::disabled()), SenderMode::User).await;
        let report = insert_report(&pool, "Taro").await;
        assert!(matches!(
            svc.send_reply(&admin(), report.id, reply(false)).await,
            Err(AppError::ServiceUnavailable(_))
        ));

        let (svc, pool) = service(Arc::new(RecordingMailer::failing()), SenderMode::User).await;
        let report = insert_report(&pool, "Taro").await;
        assert!(matches!(
            svc.send_reply(&admin(), report.id, reply(false)).await,
            Err(AppError::ExternalServiceError(_))
        ));
        let stored = svc.reports.get_by_id(report.id).await.unwrap();
        assert!(!stored.email_sent);
    }
}
