// src/services/storage.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use uuid::Uuid;

use crate::common::error::AppError;

pub const ORDER_IMAGES_BUCKET: &str = "order-images";
pub const QR_CODES_BUCKET: &str = "alipay-qrcodes";

/// Onde ficam as fotos de envio e os QR Codes do Alipay.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Grava o objeto e devolve a URL pública.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, AppError>;
    /// Apagar um objeto que não existe não é erro.
    async fn delete(&self, key: &str) -> Result<(), AppError>;
    fn public_url(&self, key: &str) -> String;
}

// --- Validação do upload ---

/// Imagem já conferida (tamanho e formato), pronta para gravar.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

pub fn sniff_image(bytes: Vec<u8>, max_bytes: usize) -> Result<ImageUpload, AppError> {
    if bytes.is_empty() {
        return Err(AppError::InvalidUpload("arquivo vazio".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::FileTooLarge(max_bytes));
    }

    let extension = match image::guess_format(&bytes) {
        Ok(ImageFormat::Png) => "png",
        Ok(ImageFormat::Jpeg) => "jpg",
        Ok(ImageFormat::WebP) => "webp",
        Ok(ImageFormat::Gif) => "gif",
        _ => return Err(AppError::UnsupportedImageFormat),
    };

    Ok(ImageUpload { bytes, extension })
}

pub fn order_image_key(order_id: Uuid, extension: &str) -> String {
    format!("{}/{}/{}.{}", ORDER_IMAGES_BUCKET, order_id, Uuid::new_v4(), extension)
}

pub fn qr_code_key(user_id: Uuid, extension: &str) -> String {
    format!("{}/{}/qrcode.{}", QR_CODES_BUCKET, user_id, extension)
}

// --- Disco local, servido em /storage ---

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let is_safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !is_safe {
            return Err(AppError::StorageError(format!("chave inválida: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::StorageError(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        tracing::debug!("📦 Objeto gravado: {}", key);
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(e.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/storage/{}", self.base_url, key)
    }
}

/// Remove objetos gravados quando a parte do banco falhou. Só registra falhas.
pub async fn discard_objects(storage: &dyn ObjectStorage, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!("Falha ao remover objeto órfão {}: {:?}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    #[test]
    fn recognises_supported_formats() {
        assert_eq!(sniff_image(PNG.to_vec(), 1024).unwrap().extension, "png");
        assert_eq!(sniff_image(JPEG.to_vec(), 1024).unwrap().extension, "jpg");
    }

    #[test]
    fn rejects_empty_oversized_and_unknown_files() {
        assert!(matches!(sniff_image(Vec::new(), 1024), Err(AppError::InvalidUpload(_))));
        assert!(matches!(sniff_image(PNG.to_vec(), 4), Err(AppError::FileTooLarge(4))));
        assert!(matches!(
            sniff_image(b"not an image at all".to_vec(), 1024),
            Err(AppError::UnsupportedImageFormat)
        ));
    }

    #[test]
    fn keys_follow_bucket_layout() {
        let order_id = Uuid::new_v4();
        let key = order_image_key(order_id, "png");
        assert!(key.starts_with(&format!("order-images/{}/", order_id)));
        assert!(key.ends_with(".png"));

        let user_id = Uuid::new_v4();
        assert_eq!(qr_code_key(user_id, "jpg"), format!("alipay-qrcodes/{}/qrcode.jpg", user_id));
    }

    #[tokio::test]
    async fn put_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/");

        let url = storage.put("order-images/abc/1.png", &PNG).await.unwrap();
        assert_eq!(url, "http://localhost:3000/storage/order-images/abc/1.png");

        let written = tokio::fs::read(dir.path().join("order-images/abc/1.png")).await.unwrap();
        assert_eq!(written, PNG);

        storage.delete("order-images/abc/1.png").await.unwrap();
        assert!(!dir.path().join("order-images/abc/1.png").exists());
        // segunda remoção é no-op
        storage.delete("order-images/abc/1.png").await.unwrap();
    }

    #[tokio::test]
    async fn refuses_keys_escaping_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000");
        assert!(matches!(
            storage.put("../fora.png", &PNG).await,
            Err(AppError::StorageError(_))
        ));
        assert!(matches!(
            storage.put("/etc/passwd", &PNG).await,
            Err(AppError::StorageError(_))
        ));
    }
}
