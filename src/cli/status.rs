//! The status table shared by `status` and the telemetry frame.

use crate::app::ports::Environment;
use crate::config::CliConfig;

/// Print the status table, one `%-12s%10x` row per line.
pub fn print(env: &mut dyn Environment, config: &CliConfig) {
    let t = env.telemetry();
    let duty = t.actual_duty();
    let comm_period = (t.crossing_period / config.timer_mult.max(1)) as f32;

    let input = env.input_mode().label();
    let run = env.run_mode().label();
    let state = env.state().label();

    text_row(env, "INPUT MODE", input);
    text_row(env, "RUN MODE", run);
    text_row(env, "ESC STATE", state);
    float_row(env, "PERCENT IDLE", t.idle_percent);
    float_row(env, "COMM PERIOD", comm_period);
    int_row(env, "BAD DETECTS", t.total_bad_detects);
    float_row(env, "FET DUTY", duty * 100.0);
    float_row(env, "RPM", t.rpm);
    float_row(env, "AMPS AVG", t.avg_amps);
    float_row(env, "AMPS MAX", t.max_amps);
    float_row(env, "BAT VOLTS", t.avg_volts);
    float_row(env, "MOTOR VOLTS", t.avg_volts * duty);

    if config.show_disarm_code {
        int_row(env, "DISARM CODE", u32::from(t.disarm_reason as u8));
    }
}

fn text_row(env: &mut dyn Environment, label: &str, value: &str) {
    env.print_fmt(format_args!("{label:<12}{value:>10}\r\n"));
}

fn int_row(env: &mut dyn Environment, label: &str, value: u32) {
    env.print_fmt(format_args!("{label:<12}{value:>10}\r\n"));
}

fn float_row(env: &mut dyn Environment, label: &str, value: f32) {
    env.print_fmt(format_args!("{label:<12}{value:>10.2}\r\n"));
}
