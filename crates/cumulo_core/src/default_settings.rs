/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedValue {
    Literal(&'static str),
    /// Random ASCII letters of the given length, generated only when the row is created.
    RandomToken(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSetting {
    pub name: &'static str,
    pub value: SeedValue,
    pub kind: &'static str,
}

const fn lit(name: &'static str, value: &'static str, kind: &'static str) -> DefaultSetting {
    DefaultSetting {
        name,
        value: SeedValue::Literal(value),
        kind,
    }
}

const OVER_USED_TEMPLATE: &str = include_str!("../templates/over_used.html");
const MAIL_ACTIVATION_TEMPLATE: &str = include_str!("../templates/mail_activation.html");
const MAIL_RESET_PWD_TEMPLATE: &str = include_str!("../templates/mail_reset_pwd.html");
const THEMES: &str = include_str!("../templates/themes.json");

pub const DEFAULT_SETTINGS: &[DefaultSetting] = &[
    lit("siteURL", "", "basic"),
    lit("siteName", "Cumulo", "basic"),
    lit("siteStatus", "open", "basic"),
    lit("register_enabled", "1", "register"),
    lit("default_group", "2", "register"),
    lit("siteKeywords", "cloud storage, file sharing", "basic"),
    lit("siteDes", "Cumulo", "basic"),
    lit("siteTitle", "Your files, anywhere", "basic"),
    lit("fromName", "Cumulo", "mail"),
    lit("mail_keepalive", "30", "mail"),
    lit("fromAdress", "no-reply@cumulo.local", "mail"),
    lit("smtpHost", "smtp.cumulo.local", "mail"),
    lit("smtpPort", "25", "mail"),
    lit("replyTo", "support@cumulo.local", "mail"),
    lit("smtpUser", "no-reply@cumulo.local", "mail"),
    lit("smtpPass", "", "mail"),
    lit("encriptionType", "no", "mail"),
    lit("over_used_template", OVER_USED_TEMPLATE, "mail_template"),
    lit("ban_time", "10", "storage_policy"),
    lit("maxEditSize", "100000", "file_edit"),
    lit("oss_timeout", "3600", "timeout"),
    lit("archive_timeout", "30", "timeout"),
    lit("download_timeout", "30", "timeout"),
    lit("preview_timeout", "60", "timeout"),
    lit("doc_preview_timeout", "60", "timeout"),
    lit("upload_credential_timeout", "1800", "timeout"),
    lit("upload_session_timeout", "86400", "timeout"),
    lit("slave_api_timeout", "60", "timeout"),
    lit("onedrive_monitor_timeout", "600", "timeout"),
    lit("share_download_session_timeout", "2073600", "timeout"),
    lit("onedrive_callback_check", "20", "timeout"),
    lit("aria2_call_timeout", "5", "timeout"),
    lit("onedrive_chunk_retries", "1", "retry"),
    lit("allowdVisitorDownload", "false", "share"),
    lit("login_captcha", "0", "login"),
    lit("qq_login", "0", "login"),
    lit("qq_login_id", "", "login"),
    lit("qq_login_key", "", "login"),
    lit("reg_captcha", "0", "login"),
    lit("email_active", "0", "register"),
    lit("mail_activation_template", MAIL_ACTIVATION_TEMPLATE, "mail_template"),
    lit("forget_captcha", "0", "login"),
    lit("mail_reset_pwd_template", MAIL_RESET_PWD_TEMPLATE, "mail_template"),
    lit("pack_data", "[]", "pack"),
    lit("database_version", "6", "version"),
    lit("alipay_enabled", "0", "payment"),
    lit("payjs_enabled", "0", "payment"),
    lit("payjs_id", "", "payment"),
    lit("payjs_secret", "", "payment"),
    lit("appid", "", "payment"),
    lit("appkey", "", "payment"),
    lit("shopid", "", "payment"),
    lit("hot_share_num", "10", "share"),
    lit("allow_buy_group", "1", "group_sell"),
    lit("group_sell_data", "[]", "group_sell"),
    lit("gravatar_server", "https://www.gravatar.com/", "avatar"),
    lit("defaultTheme", "#3f51b5", "basic"),
    lit("themes", THEMES, "basic"),
    lit("aria2_token", "your token", "aria2"),
    lit("aria2_temp_path", "", "aria2"),
    lit("aria2_options", "[]", "aria2"),
    lit("aria2_interval", "10", "aria2"),
    lit("max_worker_num", "10", "task"),
    lit("max_parallel_transfer", "4", "task"),
    DefaultSetting {
        name: "secret_key",
        value: SeedValue::RandomToken(256),
        kind: "auth",
    },
    lit("temp_path", "temp", "path"),
    lit("avatar_path", "avatar", "path"),
    lit("avatar_size", "2097152", "avatar"),
    lit("avatar_size_l", "200", "avatar"),
    lit("avatar_size_m", "130", "avatar"),
    lit("avatar_size_s", "50", "avatar"),
    lit("score_enabled", "1", "score"),
    lit("share_score_rate", "80", "score"),
    lit("score_price", "1", "score"),
    lit("home_view_method", "icon", "view"),
    lit("share_view_method", "list", "view"),
    lit("cron_garbage_collect", "@hourly", "cron"),
    lit("cron_notify_user", "@hourly", "cron"),
    lit("cron_ban_user", "@hourly", "cron"),
    lit("authn_enabled", "1", "authn"),
];

/// Names that occur more than once in `list`, each reported once, in list order.
pub fn duplicate_names(list: &[DefaultSetting]) -> Vec<&'static str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    for entry in list {
        if !seen.insert(entry.name) && reported.insert(entry.name) {
            out.push(entry.name);
        }
    }
    out
}
