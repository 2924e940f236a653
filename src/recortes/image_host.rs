// src/recortes/image_host.rs
//
// Cliente fino do serviço externo de hospedagem de imagens. O catálogo só
// guarda a URL pública; upload e remoção acontecem aqui, antes de qualquer
// escrita no banco.

use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ErroImagem {
    #[error("falha na requisição ao host de imagens: {0}")]
    Http(#[from] reqwest::Error),

    #[error("host de imagens respondeu {0}")]
    Status(reqwest::StatusCode),
}

/// Resultado de um upload bem-sucedido.
pub struct ImagemHospedada {
    pub url: String,
    pub public_id: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Clone)]
pub struct ImageHost {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pasta: String,
}

impl ImageHost {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.image_host_url.clone(),
            api_key: config.image_host_api_key.clone(),
            pasta: config.image_host_folder.clone(),
        }
    }

    /// Envia os bytes da imagem e devolve a URL hospedada.
    pub async fn enviar(
        &self,
        bytes: Vec<u8>,
        nome_arquivo: &str,
    ) -> Result<ImagemHospedada, ErroImagem> {
        let form = multipart::Form::new()
            .text("folder", self.pasta.clone())
            .text("public_id", nome_arquivo.to_string())
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(nome_arquivo.to_string()),
            );

        let resposta = self
            .http
            .post(format!("{}/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !resposta.status().is_success() {
            return Err(ErroImagem::Status(resposta.status()));
        }

        let corpo: UploadResponse = resposta.json().await?;
        Ok(ImagemHospedada {
            url: corpo.secure_url,
            public_id: corpo.public_id,
        })
    }

    /// Remove uma imagem hospedada a partir da sua URL pública. Os
    /// chamadores tratam a falha como melhor esforço.
    pub async fn remover_por_url(&self, url: &str) -> Result<(), ErroImagem> {
        let public_id = self.public_id_da_url(url);

        let resposta = self
            .http
            .delete(format!("{}/destroy", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[("public_id", public_id.as_str())])
            .send()
            .await?;

        if !resposta.status().is_success() {
            return Err(ErroImagem::Status(resposta.status()));
        }
        Ok(())
    }

    /// Extrai o public_id (`pasta/nome-sem-extensão`) do último segmento da
    /// URL hospedada.
    fn public_id_da_url(&self, url: &str) -> String {
        let ultimo = url.rsplit('/').next().unwrap_or(url);
        let sem_extensao = ultimo.split('.').next().unwrap_or(ultimo);
        format!("{}/{}", self.pasta, sem_extensao)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_de_teste() -> ImageHost {
        ImageHost {
            http: reqwest::Client::new(),
            base_url: "https://imagens.exemplo.com".to_string(),
            api_key: "chave".to_string(),
            pasta: "recortes".to_string(),
        }
    }

    #[test]
    fn public_id_vem_do_ultimo_segmento_sem_extensao() {
        let host = host_de_teste();
        assert_eq!(
            host.public_id_da_url("https://cdn.exemplo.com/v123/recortes/americano_frente_linho_laranja.png"),
            "recortes/americano_frente_linho_laranja"
        );
        assert_eq!(host.public_id_da_url("sem-barras"), "recortes/sem-barras");
    }
}
