// src/handlers/upload.rs

use std::collections::HashMap;

use axum::{extract::Multipart, http::StatusCode};

use crate::common::error::AppError;

/// Campos de texto e arquivos de um formulário multipart.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub texts: HashMap<String, String>,
    pub files: Vec<(String, Vec<u8>)>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> String {
        self.texts.get(name).cloned().unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<Vec<u8>> {
        let index = self.files.iter().position(|(field, _)| field == name)?;
        Some(self.files.remove(index).1)
    }

    pub fn take_files(&mut self, name: &str) -> Vec<Vec<u8>> {
        let (wanted, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        wanted.into_iter().map(|(_, bytes)| bytes).collect()
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge(max_bytes)
    } else {
        AppError::InvalidUpload(e.body_text())
    }
}

/// Lê o formulário inteiro. Cada arquivo é cortado em `max_bytes`; campo de
/// arquivo sem nome e sem conteúdo (input vazio do navegador) é ignorado.
pub async fn read_form(multipart: &mut Multipart, max_bytes: usize) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name {
            Some(file_name) => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max_bytes))? {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(AppError::FileTooLarge(max_bytes));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.push((name, bytes));
            }
            None => {
                let value = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
                form.texts.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_taken_by_field_name() {
        let mut form = MultipartForm {
            texts: HashMap::from([("tracking_code".to_string(), "LP1".to_string())]),
            files: vec![
                ("images".to_string(), vec![1]),
                ("other".to_string(), vec![2]),
                ("images".to_string(), vec![3]),
            ],
        };

        assert_eq!(form.text("tracking_code"), "LP1");
        assert_eq!(form.text("missing"), "");
        assert_eq!(form.take_files("images"), vec![vec![1], vec![3]]);
        assert_eq!(form.take_file("other"), Some(vec![2]));
        assert!(form.take_file("other").is_none());
    }
}
