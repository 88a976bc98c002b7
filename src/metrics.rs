//! # Métricas do Processo
//!
//! Snapshot de RAM/CPU exibido abaixo de cada execução de raciocínio
//! (página para frente, caçada para trás, turno do chat) e no `/status`.
//!
//! | Categoria | Métrica | Fonte |
//! |-----------|---------|-------|
//! | RAM | Processo (MB) / Total (MB) | `sysinfo` |
//! | CPU | Cores ativos / Total / Pico por core | `sysinfo` |
//! | Sessões | Sessões vivas | `SessionStore` |
//! | Trabalho | passos do raciocínio (opcional) | calculado pelo handler |
//!
//! ## Estado Persistente (System singleton)
//!
//! A lib `sysinfo` precisa de um baseline anterior para calcular
//! deltas de CPU. Por isso, mantemos uma única instância [`System`]
//! via [`OnceLock`] + [`Mutex`], reutilizada em todas as coletas.

use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

static SYS: OnceLock<Mutex<System>> = OnceLock::new();

fn system() -> &'static Mutex<System> {
    SYS.get_or_init(|| {
        let mut s = System::new();
        s.refresh_cpu_usage(); // baseline para deltas futuros
        Mutex::new(s)
    })
}

/// Snapshot de métricas do processo.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessMetrics {
    /// Memória RSS do processo em MB.
    pub memory_used_mb: f64,
    /// Memória total do sistema em MB.
    pub memory_total_mb: f64,
    /// Número de cores CPU com uso > 1%.
    pub cpu_active_cores: usize,
    /// Maior uso individual de CPU entre todos os cores (%).
    pub cpu_max_core_percent: f32,
    /// Total de cores lógicos.
    pub cpu_total_cores: usize,
    /// Sessões de raciocínio vivas.
    pub sessions: usize,
    /// Trabalho feito pela execução (ex: "4 firings"), se houver.
    pub work: Option<String>,
}

/// Coleta um snapshot de métricas.
///
/// - `sessions`: tamanho atual do armazém de sessões
/// - `work`: resumo do trabalho da execução, `None` fora de uma execução
pub fn collect_metrics(sessions: usize, work: Option<String>) -> ProcessMetrics {
    let pid = Pid::from_u32(std::process::id());

    let mut sys = system().lock();
    sys.refresh_memory();
    sys.refresh_cpu_usage();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), false);

    let memory_used_mb = sys
        .process(pid)
        .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);
    let memory_total_mb = sys.total_memory() as f64 / (1024.0 * 1024.0);

    let cpus = sys.cpus();
    let cpu_total_cores = cpus.len();
    let cpu_active_cores = cpus.iter().filter(|c| c.cpu_usage() > 1.0).count();
    let cpu_max_core_percent = cpus
        .iter()
        .map(|c| c.cpu_usage())
        .fold(0.0f32, f32::max);

    ProcessMetrics {
        memory_used_mb,
        memory_total_mb,
        cpu_active_cores,
        cpu_max_core_percent,
        cpu_total_cores,
        sessions,
        work,
    }
}

impl ProcessMetrics {
    /// Linha de sumário exibida abaixo do resultado.
    ///
    /// Formato: `"85µs | 4 firings | RAM 12.3 MB | CPU 1/8 cores peak 12.0% | 3 sessions"`
    pub fn summary_line(&self, elapsed: Duration) -> String {
        // o raciocínio costuma terminar bem abaixo de 1ms
        let time = if elapsed < Duration::from_millis(1) {
            format!("{}µs", elapsed.as_micros())
        } else {
            format!("{}ms", elapsed.as_millis())
        };

        let work_part = match &self.work {
            Some(w) => format!(" | {}", w),
            None => String::new(),
        };

        format!(
            "{}{} | RAM {:.1} MB | CPU {}/{} cores peak {:.1}% | {} session{}",
            time,
            work_part,
            self.memory_used_mb,
            self.cpu_active_cores,
            self.cpu_total_cores,
            self.cpu_max_core_percent,
            self.sessions,
            if self.sessions == 1 { "" } else { "s" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(work: Option<&str>) -> ProcessMetrics {
        ProcessMetrics {
            memory_used_mb: 12.34,
            memory_total_mb: 16384.0,
            cpu_active_cores: 1,
            cpu_max_core_percent: 12.0,
            cpu_total_cores: 8,
            sessions: 1,
            work: work.map(str::to_string),
        }
    }

    #[test]
    fn summary_uses_micros_for_fast_runs() {
        let line = sample(Some("4 firings")).summary_line(Duration::from_micros(85));
        assert_eq!(line, "85µs | 4 firings | RAM 12.3 MB | CPU 1/8 cores peak 12.0% | 1 session");
    }

    #[test]
    fn summary_uses_millis_otherwise() {
        let line = sample(None).summary_line(Duration::from_millis(42));
        assert!(line.starts_with("42ms | RAM"));
    }

    #[test]
    fn collect_reports_cores() {
        let metrics = collect_metrics(3, None);
        assert_eq!(metrics.sessions, 3);
        assert!(metrics.cpu_active_cores <= metrics.cpu_total_cores);
    }
}
