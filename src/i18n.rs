//! Indonesian/English string table and language switching.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Id,
    En,
}

/// `(key, Indonesian, English)` rows, ported from the original UI strings.
const TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("welcome", "Selamat datang", "Welcome"),
    ("login", "Silakan masuk untuk melanjutkan", "Please log in to continue"),
    ("login_fail", "Username atau password salah", "Wrong username or password"),
    ("logout_msg", "Anda telah keluar", "You have been logged out"),
    ("dashboard_title", "Dasbor", "Dashboard"),
    ("generate_title", "Buat Surat Massal", "Generate Bulk Letters"),
    ("analysis_title", "Analisis Data", "Data Analysis"),
    ("upload_template", "Unggah template surat (.docx)", "Upload letter template (.docx)"),
    ("upload_data", "Unggah data peserta (.xlsx / .csv)", "Upload participant data (.xlsx / .csv)"),
    ("upload_first", "Unggah template dan data terlebih dahulu", "Upload a template and data first"),
    ("select_name_col", "Pilih kolom nama", "Select the name column"),
    ("select_link_col", "Pilih kolom link", "Select the link column"),
    ("search_name", "Cari nama", "Search name"),
    ("preview_letter", "Pratinjau surat", "Letter preview"),
    ("download_preview", "Unduh pratinjau", "Download preview"),
    ("generate_all", "Buat semua surat", "Generate all letters"),
    ("generate_done", "Semua surat selesai dibuat", "All letters generated"),
    ("processing_letters", "Memproses surat", "Processing letters"),
    ("download_all_zip", "Unduh semua (ZIP)", "Download all (ZIP)"),
    ("view_log", "Lihat log", "View log"),
    ("total_letters", "Total surat", "Total letters"),
    ("letters_success", "Surat berhasil", "Letters succeeded"),
    ("letters_failed", "Surat gagal", "Letters failed"),
    ("templates_available", "Template tersedia", "Templates available"),
    ("last_data_rows", "Baris data terakhir", "Last data rows"),
    ("last_activity", "Aktivitas terakhir", "Recent activity"),
    ("no_activity", "Belum ada aktivitas", "No activity yet"),
    ("no_data", "Belum ada data", "No data yet"),
    ("choose_language", "Pilih bahasa", "Choose language"),
];

/// Look up one UI string. The table is closed, so an unknown key is a typo
/// in the caller; it renders as "?" instead of hiding the page.
pub fn t(key: &str, lang: Lang) -> &'static str {
    for (entry_key, id, en) in TRANSLATIONS {
        if *entry_key == key {
            return match lang {
                Lang::Id => id,
                Lang::En => en,
            };
        }
    }
    "?"
}

/// The whole table for one language, for frontends that cache it.
pub fn table(lang: Lang) -> HashMap<&'static str, &'static str> {
    TRANSLATIONS
        .iter()
        .map(|(key, id, en)| {
            (
                *key,
                match lang {
                    Lang::Id => *id,
                    Lang::En => *en,
                },
            )
        })
        .collect()
}
