use chrono::{DateTime, FixedOffset, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::{Format, Workbook};

use crate::database::models::{TestResult, User};
use crate::error::ExportError;
use crate::stats::{best_results, format_time};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_MM: f32 = 15.0;
const LINE_MM: f32 = 6.0;
const FONT_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 14.0;

const USER_HEADERS: [&str; 11] = [
    "ID",
    "Bola ismi",
    "Ota-ona ismi",
    "Telefon",
    "Yosh",
    "Yosh guruhi",
    "Viloyat",
    "Tuman",
    "Mahalla",
    "Username",
    "Ro'yxatdan o'tgan",
];

const RESULT_HEADERS: [&str; 7] = [
    "ID",
    "Bola ismi",
    "Yosh guruhi",
    "To'g'ri javoblar",
    "Foiz",
    "Vaqt (s)",
    "Sana",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

pub fn export_file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    let stamp = match FixedOffset::east_opt(5 * 3600) {
        Some(tz) => now.with_timezone(&tz).format("%Y%m%d_%H%M").to_string(),
        None => now.format("%Y%m%d_%H%M").to_string(),
    };
    format!("kitobxon_users_{stamp}.{}", format.extension())
}

pub fn export(
    format: ExportFormat,
    users: &[User],
    results: &[TestResult],
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Xlsx => users_to_xlsx(users, results),
        ExportFormat::Pdf => users_to_pdf(users, results),
    }
}

pub fn users_to_xlsx(users: &[User], results: &[TestResult]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Foydalanuvchilar")?;
        for (col, header) in USER_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (i, user) in users.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, user.user_id.to_string())?;
            sheet.write_string(row, 1, user.child_name.as_str())?;
            sheet.write_string(row, 2, user.parent_name.as_str())?;
            sheet.write_string(row, 3, user.phone.as_str())?;
            sheet.write_number(row, 4, f64::from(user.age))?;
            sheet.write_string(row, 5, user.age_group.as_str())?;
            sheet.write_string(row, 6, user.region.as_str())?;
            sheet.write_string(row, 7, user.district.as_str())?;
            sheet.write_string(row, 8, user.mahalla.as_str())?;
            sheet.write_string(row, 9, user.telegram_username.as_deref().unwrap_or(""))?;
            sheet.write_string(row, 10, format_time(user.registered_at))?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Natijalar")?;
        for (col, header) in RESULT_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        }
        for (i, result) in results.iter().enumerate() {
            let row = i as u32 + 1;
            let name = users
                .iter()
                .find(|u| u.user_id == result.user_id)
                .map(|u| u.child_name.as_str())
                .unwrap_or("");
            sheet.write_string(row, 0, result.user_id.to_string())?;
            sheet.write_string(row, 1, name)?;
            sheet.write_string(row, 2, result.age_group.as_str())?;
            sheet.write_string(
                row,
                3,
                format!("{}/{}", result.correct_answers, result.total_questions),
            )?;
            sheet.write_number(row, 4, result.percentage)?;
            sheet.write_number(row, 5, result.duration_seconds as f64)?;
            sheet.write_string(row, 6, format_time(result.completed_at))?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Builtin PDF fonts only cover Latin-1, so Uzbek apostrophes are folded to ASCII.
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ʻ' | 'ʼ' | '’' | '‘' => '\'',
            c => c,
        })
        .collect()
}

pub fn users_to_pdf(users: &[User], results: &[TestResult]) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) =
        PdfDocument::new("Kitobxon Kids", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))?;

    let best = best_results(results);
    let top = PAGE_HEIGHT.0 - MARGIN_MM;
    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = top;

    layer.use_text(
        "Kitobxon Kids - foydalanuvchilar",
        TITLE_SIZE,
        Mm(MARGIN_MM),
        Mm(y),
        &bold,
    );
    y -= LINE_MM * 2.0;
    layer.use_text(
        format!("Jami: {}", users.len()),
        FONT_SIZE,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= LINE_MM * 1.5;

    for (i, user) in users.iter().enumerate() {
        if y < MARGIN_MM + LINE_MM * 2.0 {
            let (page, next) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer = doc.get_page(page).get_layer(next);
            y = top;
        }

        let best = best
            .get(&user.user_id)
            .map(|r| format!("{:.0}%", r.percentage))
            .unwrap_or_else(|| "-".to_owned());
        layer.use_text(
            pdf_text(&format!(
                "{}. {} ({}), {} yosh guruhi",
                i + 1,
                user.child_name,
                user.parent_name,
                user.age_group
            )),
            FONT_SIZE,
            Mm(MARGIN_MM),
            Mm(y),
            &bold,
        );
        y -= LINE_MM;
        layer.use_text(
            pdf_text(&format!(
                "{}, {} | tel: {} | eng yaxshi natija: {}",
                user.region, user.district, user.phone, best
            )),
            FONT_SIZE,
            Mm(MARGIN_MM + 5.0),
            Mm(y),
            &font,
        );
        y -= LINE_MM * 1.5;
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::database::models::AgeGroup;

    fn users(n: i64) -> Vec<User> {
        let at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
        (1..=n)
            .map(|id| User {
                user_id: id,
                child_name: format!("Bola {id}"),
                parent_name: "Oʻlmas".into(),
                phone: "998901234567".into(),
                age: 9,
                age_group: AgeGroup::SevenToTen,
                region: "Toshkent shahri".into(),
                district: "Chilonzor".into(),
                mahalla: "Namuna".into(),
                telegram_username: Some("bola".into()),
                telegram_name: None,
                registered_at: at,
                updated_at: at,
            })
            .collect()
    }

    fn results() -> Vec<TestResult> {
        vec![TestResult {
            id: Uuid::new_v4(),
            user_id: 1,
            age_group: AgeGroup::SevenToTen,
            total_questions: 25,
            correct_answers: 20,
            percentage: 80.0,
            duration_seconds: 240,
            answers: Vec::new(),
            completed_at: Utc::now(),
        }]
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = users_to_xlsx(&users(3), &results()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn pdf_spans_multiple_pages() {
        let bytes = users_to_pdf(&users(60), &results()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_exports_still_produce_files() {
        assert!(export(ExportFormat::Xlsx, &[], &[]).unwrap().starts_with(b"PK"));
        assert!(export(ExportFormat::Pdf, &[], &[]).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn file_name_carries_local_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 20, 5, 0).unwrap();
        assert_eq!(
            export_file_name(ExportFormat::Pdf, now),
            "kitobxon_users_20250802_0105.pdf"
        );
    }
}
