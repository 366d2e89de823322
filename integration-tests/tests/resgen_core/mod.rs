mod cordova;
mod pipeline;
