// src/recortes/mod.rs

// Declara o submódulo que contém as definições das structs de recortes
pub mod recorte_structs;
// Declara o submódulo que contém as funções de rota relacionadas a recortes
pub mod recorte_router;
// Cliente do serviço externo de hospedagem de imagens
pub mod image_host;
