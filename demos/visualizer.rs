use key_synth::{note::Channel, Config, Synth};

fn main() -> key_synth::Result<()> {
    let cfg = Config {
        sample_rate: 8000,
        ..Default::default()
    };
    let synth = Synth::new(cfg)?;

    let mut out_buf = vec![0.0f32; 256];

    // a held harmonica note, past its attack
    synth.key_down(0, Channel::HARMONICA, 0.0);
    synth.render(&mut out_buf, 0.2);

    for sample in out_buf.iter() {
        // construct a waveform
        let width = 80;
        let zero = width / 2;
        let amp = (sample * zero as f32) as i32;
        let mut wave = String::new();
        for i in 0..width {
            if i == zero {
                wave.push('|');
            } else if i == zero + amp {
                wave.push('+');
            } else {
                wave.push(' ');
            }
        }
        println!("{}", wave);
    }
    Ok(())
}
